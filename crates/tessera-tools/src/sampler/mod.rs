//! Diversity sampler helper tool
//!
//! Lets the model read a large body of text a few representative chunks at a
//! time. The corpus lives in the run state as a [`SamplerState`]; any run
//! state that implements [`HasSamplerState`] can host the tool alongside
//! other helper tools.

mod diversity;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tessera_core::AgentState;
use tessera_core::tools::{HelperTool, ToolReducer, ToolTransition};
use tessera_core::validation::{FieldSchema, FieldType, SchemaBuilder};
use tracing::debug;

pub const SAMPLER_TOOL_NAME: &str = "sample_chunks";
pub const DEFAULT_SAMPLE_COUNT: usize = 3;
pub const MAX_SAMPLE_COUNT: usize = 20;

/// Corpus and selection history for the sampler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerState {
    pub chunks: Vec<String>,
    /// Indices already handed to the model, in the order they were sampled
    pub selected: Vec<usize>,
}

impl SamplerState {
    pub fn new(chunks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            selected: Vec::new(),
        }
    }

    /// Split `text` into chunks of at most `words_per_chunk` words
    pub fn from_text(text: &str, words_per_chunk: usize) -> Self {
        Self::new(diversity::chunk_words(text, words_per_chunk))
    }

    pub fn remaining(&self) -> usize {
        self.chunks.len().saturating_sub(self.selected.len())
    }
}

/// Run states that can host a [`SamplerState`]
pub trait HasSamplerState {
    fn sampler_state(&self) -> Option<&SamplerState>;
    fn set_sampler_state(&mut self, state: SamplerState);
}

impl HasSamplerState for Option<SamplerState> {
    fn sampler_state(&self) -> Option<&SamplerState> {
        self.as_ref()
    }

    fn set_sampler_state(&mut self, state: SamplerState) {
        *self = Some(state);
    }
}

/// Reducer behind the sampler tool
#[derive(Debug, Clone, Copy)]
pub struct SamplerReducer {
    words_per_chunk: usize,
}

impl SamplerReducer {
    pub fn new(words_per_chunk: usize) -> Self {
        Self {
            words_per_chunk: words_per_chunk.max(1),
        }
    }
}

impl Default for SamplerReducer {
    fn default() -> Self {
        Self::new(60)
    }
}

impl<R, A> ToolReducer<R, A> for SamplerReducer
where
    R: HasSamplerState + Send + Sync,
    A: Send + Sync,
{
    fn reduce(
        &self,
        mut state: AgentState<R, A>,
        input: &Value,
    ) -> Result<ToolTransition<R, A>, String> {
        let count = match input.get("count").and_then(Value::as_u64) {
            Some(n) => n as usize,
            None => DEFAULT_SAMPLE_COUNT,
        };

        let mut sampler = match input.get("text").and_then(Value::as_str) {
            Some(text) => SamplerState::from_text(text, self.words_per_chunk),
            None => state
                .run
                .sampler_state()
                .cloned()
                .ok_or_else(|| "No text loaded. Call the tool with `text` first.".to_string())?,
        };
        if sampler.chunks.is_empty() {
            return Err("The loaded text contains no words".to_string());
        }

        let picks = diversity::select(&sampler.chunks, &sampler.selected, count);
        let remaining = sampler.remaining().saturating_sub(picks.len());
        debug!(picked = picks.len(), remaining, "Sampled chunks");

        let samples: Vec<Value> = picks
            .iter()
            .map(|&index| json!({ "index": index, "text": sampler.chunks[index] }))
            .collect();
        sampler.selected.extend(picks);
        let result = json!({
            "samples": samples,
            "remaining": sampler.remaining(),
        });

        state.run.set_sampler_state(sampler);
        Ok(ToolTransition::new(state, result))
    }
}

/// Sampler tool with the default chunk size
pub fn sampler_tool<R, A>() -> HelperTool<R, A>
where
    R: HasSamplerState + Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    sampler_tool_with(SamplerReducer::default())
}

pub fn sampler_tool_with<R, A>(reducer: SamplerReducer) -> HelperTool<R, A>
where
    R: HasSamplerState + Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    let schema = SchemaBuilder::new()
        .field(
            "text",
            FieldSchema::new(FieldType::String)
                .description("Text to load; replaces any previously loaded text")
                .non_empty(),
        )
        .field(
            "count",
            FieldSchema::new(FieldType::Integer)
                .description("How many chunks to return")
                .min_value(1.0)
                .max_value(MAX_SAMPLE_COUNT as f64),
        )
        .build();

    HelperTool::new(
        SAMPLER_TOOL_NAME,
        "Returns the loaded chunks least similar to those already seen. \
         Pass `text` once to load it, then call again for more samples.",
        schema,
        reducer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::ExecutionContext;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Notes {
        sampler: Option<SamplerState>,
        notes: Vec<String>,
    }

    impl HasSamplerState for Notes {
        fn sampler_state(&self) -> Option<&SamplerState> {
            self.sampler.as_ref()
        }

        fn set_sampler_state(&mut self, state: SamplerState) {
            self.sampler = Some(state);
        }
    }

    fn state(run: Notes) -> AgentState<Notes, ()> {
        AgentState::new(ExecutionContext::new(1, 3, 10), run, ())
    }

    #[test]
    fn test_from_text_chunks() {
        let sampler = SamplerState::from_text("a b c d e", 2);
        assert_eq!(sampler.chunks, vec!["a b", "c d", "e"]);
        assert_eq!(sampler.remaining(), 3);
    }

    #[test]
    fn test_load_then_continue_sampling() {
        let tool = sampler_tool_with::<Notes, ()>(SamplerReducer::new(3));
        let text = "red green blue cyan magenta yellow red green blue";

        let first = tool
            .invoke(state(Notes::default()), &json!({ "text": text, "count": 1 }))
            .unwrap();
        assert_eq!(first.result["remaining"], 2);
        assert_eq!(first.result["samples"][0]["index"], 0);

        let second = tool.invoke(first.state, &json!({})).unwrap();
        let samples = second.result["samples"].as_array().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0]["text"], "cyan magenta yellow");
        assert_eq!(second.result["remaining"], 0);
        assert_eq!(second.state.run.sampler.as_ref().unwrap().selected, vec![0, 1, 2]);
    }

    #[test]
    fn test_reducer_is_deterministic_and_leaves_other_fields() {
        let tool = sampler_tool::<Notes, ()>();
        let run = Notes {
            sampler: Some(SamplerState::new(["alpha beta", "gamma delta", "alpha gamma"])),
            notes: vec!["keep me".to_string()],
        };

        let a = tool.invoke(state(run.clone()), &json!({ "count": 2 })).unwrap();
        let b = tool.invoke(state(run), &json!({ "count": 2 })).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.state.run.notes, vec!["keep me"]);
    }

    #[test]
    fn test_errors() {
        let tool = sampler_tool::<Notes, ()>();
        let err = tool.invoke(state(Notes::default()), &json!({})).unwrap_err();
        assert!(err.contains("No text loaded"));

        let err = tool.invoke(state(Notes::default()), &json!({ "count": 0 })).unwrap_err();
        assert!(err.starts_with("Invalid arguments for tool 'sample_chunks'"));

        let err = tool.invoke(state(Notes::default()), &json!({ "text": "   " })).unwrap_err();
        assert!(err.contains("String cannot be empty"));

        let empty = Notes {
            sampler: Some(SamplerState::default()),
            ..Notes::default()
        };
        let err = tool.invoke(state(empty), &json!({})).unwrap_err();
        assert_eq!(err, "The loaded text contains no words");
    }

    #[test]
    fn test_option_run_state_hosts_sampler() {
        let tool = sampler_tool::<Option<SamplerState>, ()>();
        let start = AgentState::new(ExecutionContext::new(1, 1, 5), None, ());
        let next = tool.invoke(start, &json!({ "text": "one two" })).unwrap();
        assert_eq!(next.state.run.unwrap().chunks, vec!["one two"]);
    }
}
