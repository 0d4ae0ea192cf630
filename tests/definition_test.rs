//! Definition construction and settings

mod common;

use common::point_agent;
use tessera::config::defaults;
use tessera::prelude::*;

#[test]
fn test_every_problem_is_reported() {
    let errors = AgentDefinition::<String, (), ()>::builder("", " ")
        .model(ModelConfig::new("").with_temperature(3.5).with_max_tokens(0))
        .max_attempts(0)
        .max_iterations(0)
        .build()
        .unwrap_err();

    assert_eq!(
        errors,
        vec![
            AgentError::EmptyName,
            AgentError::EmptyDescription,
            AgentError::EmptyModelName,
            AgentError::TemperatureOutOfRange {
                value: 3.5,
                min: defaults::MIN_TEMPERATURE,
                max: defaults::MAX_TEMPERATURE,
            },
            AgentError::MaxTokensTooLow {
                value: 0,
                min: defaults::MIN_MAX_TOKENS,
            },
            AgentError::MissingPrompts,
            AgentError::MissingOutputTool,
            AgentError::InvalidMaxAttempts { value: 0 },
            AgentError::InvalidMaxIterations { value: 0 },
        ]
    );
}

#[test]
fn test_broken_pattern_stops_the_agent_from_building() {
    let schema = SchemaBuilder::new()
        .field("x", FieldSchema::new(FieldType::String).pattern("("))
        .build();
    let errors = point_agent::<(), ()>()
        .validator(SchemaValidator::new(schema).with_name("format"))
        .build()
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), "TESSERA_INVALID_PATTERN");
    assert!(errors[0].is_construction_error());
    assert!(errors[0].to_string().contains("'(' for field 'x' in 'format'"));
}

#[test]
fn test_definition_is_frozen_and_shareable() {
    let definition = point_agent::<(), ()>().max_attempts(5).build().unwrap();
    let copy = definition.clone();

    assert_eq!(copy.name(), "points");
    assert_eq!(copy.max_attempts(), 5);
    assert_eq!(copy.max_iterations(), defaults::DEFAULT_MAX_ITERATIONS);
    assert_eq!(copy.validators().names(), vec!["schema"]);
}

#[test]
fn test_settings_drive_the_builder() {
    let settings = AgentSettings::from_toml_str(
        r#"
        [model]
        model = "claude-sonnet-4"
        temperature = 0.2
        max_tokens = 1024

        [validation]
        max_attempts = 4
        max_iterations = 6
        "#,
    )
    .unwrap();

    let definition = point_agent::<(), ()>().settings(settings).build().unwrap();
    assert_eq!(definition.model().model, "claude-sonnet-4");
    assert_eq!(definition.model().temperature, 0.2);
    assert_eq!(definition.max_attempts(), 4);
    assert_eq!(definition.max_iterations(), 6);
}
