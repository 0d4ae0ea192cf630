//! Helper tools driven through the engine

mod common;

use common::{init_tracing, point_agent, scripted, submit};
use serde_json::{Value, json};
use tessera::prelude::*;
use tessera::tools_ext::{SamplerReducer, sampler_tool_with};
use tessera::validation::SchemaBuilder;
use tessera::{HasSamplerState, SamplerState, sampler_tool};

#[derive(Debug, Clone, Default, PartialEq)]
struct Workspace {
    count: i64,
    sampler: Option<SamplerState>,
}

impl HasSamplerState for Workspace {
    fn sampler_state(&self) -> Option<&SamplerState> {
        self.sampler.as_ref()
    }

    fn set_sampler_state(&mut self, state: SamplerState) {
        self.sampler = Some(state);
    }
}

fn add_one() -> HelperTool<Workspace, ()> {
    HelperTool::from_fn(
        "add_one",
        "Adds n to the counter",
        SchemaBuilder::new().integer("n").build(),
        |state: AgentState<Workspace, ()>, input: &Value| {
            let n = input["n"].as_i64().ok_or("n must be an integer")?;
            let mut run = state.run.clone();
            run.count += n;
            let count = run.count;
            Ok(ToolTransition::new(state.with_run(run), json!({ "count": count })))
        },
    )
}

fn call(id: &str, name: &str, arguments: Value) -> ModelResponse {
    ModelResponse::tool_calls(vec![ToolCall::new(id, name, arguments)])
}

#[tokio::test]
async fn test_run_state_accumulates_across_calls() {
    init_tracing();
    let provider = scripted(vec![
        call("1", "add_one", json!({ "n": 1 })),
        call("2", "add_one", json!({ "n": 1 })),
        submit(json!(2)),
    ]);
    let definition = point_agent::<Workspace, ()>().helper_tool(add_one()).build().unwrap();

    let output = Engine::new(provider.clone())
        .execute(&definition, ExecutionRequest::new("count".to_string()))
        .await
        .unwrap();

    assert_eq!(output.run_state.count, 2);
    assert_eq!(output.attempts, 1);
    let third = &provider.requests()[2];
    let result = third.messages.last().unwrap();
    assert_eq!(result.tool_call_id.as_deref(), Some("2"));
    assert!(result.content.contains("\"count\":2"));
}

#[tokio::test]
async fn test_run_state_survives_rejected_attempts() {
    let provider = scripted(vec![
        call("1", "add_one", json!({ "n": 1 })),
        submit(json!("no")),
        call("2", "add_one", json!({ "n": 1 })),
        submit(json!(1)),
    ]);
    let definition = point_agent::<Workspace, ()>().helper_tool(add_one()).build().unwrap();

    let output = Engine::new(provider)
        .execute(
            &definition,
            ExecutionRequest::new("count".to_string()).with_run_state(Workspace {
                count: 10,
                sampler: None,
            }),
        )
        .await
        .unwrap();

    assert_eq!(output.attempts, 2);
    assert_eq!(output.run_state.count, 12);
}

#[tokio::test]
async fn test_sampler_composes_with_other_tools() {
    let text = "solar panels convert light into power. \
                wind turbines turn moving air into power. \
                solar panels convert light into power.";
    let provider = scripted(vec![
        ModelResponse::tool_calls(vec![
            ToolCall::new("s1", "sample_chunks", json!({ "text": text, "count": 2 })),
            ToolCall::new("a1", "add_one", json!({ "n": 1 })),
        ]),
        submit(json!(2)),
    ]);
    let definition = point_agent::<Workspace, ()>()
        .helper_tool(add_one())
        .helper_tool(sampler_tool_with(SamplerReducer::new(4)))
        .build()
        .unwrap();
    assert_eq!(
        definition
            .tool_descriptors()
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>(),
        vec!["submit_point", "add_one", "sample_chunks"]
    );

    let output = Engine::new(provider)
        .execute(&definition, ExecutionRequest::new("energy".to_string()))
        .await
        .unwrap();

    let sampler = output.run_state.sampler.unwrap();
    assert_eq!(sampler.selected.len(), 2);
    assert_eq!(output.run_state.count, 1);
}

#[test]
fn test_reducers_replay_deterministically() {
    let tool = add_one();
    let start = AgentState::new(ExecutionContext::new(1, 3, 10), Workspace::default(), ());

    let first = tool.invoke(start.clone(), &json!({ "n": 1 })).unwrap();
    let replay = tool.invoke(start, &json!({ "n": 1 })).unwrap();
    assert_eq!(first, replay);

    let sampler = sampler_tool::<Workspace, ()>();
    let loaded = AgentState::new(
        ExecutionContext::new(1, 3, 10),
        Workspace {
            count: 0,
            sampler: Some(SamplerState::new(["a b c", "d e f", "a b g", "h i j"])),
        },
        (),
    );
    let once = sampler.invoke(loaded.clone(), &json!({ "count": 3 })).unwrap();
    let twice = sampler.invoke(loaded, &json!({ "count": 3 })).unwrap();
    assert_eq!(once.result, twice.result);
    assert_eq!(once.state, twice.state);
}
