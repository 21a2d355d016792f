use serde_json::{Value, json};

use crate::{client::Client, errors::BraviaError, rpc};

impl Client {
    pub fn content_count(&self, source: &str) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_CONTENT_COUNT, vec![json!({ "source": source })])
    }

    pub fn content_list(&self, uri: &str, start: u32, count: u32) -> Result<Value, BraviaError> {
        self.query(
            &rpc::GET_CONTENT_LIST,
            vec![json!({ "uri": uri, "stIdx": start, "cnt": count })],
        )
    }

    pub fn current_external_inputs_status(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_CURRENT_EXTERNAL_INPUTS_STATUS, Vec::new())
    }

    pub fn scheme_list(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_SCHEME_LIST, Vec::new())
    }

    pub fn source_list(&self, scheme: &str) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_SOURCE_LIST, vec![json!({ "scheme": scheme })])
    }

    pub fn playing_content_info(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_PLAYING_CONTENT_INFO, Vec::new())
    }

    /// Switches to a channel or input, e.g. `extInput:hdmi?port=1`.
    pub fn set_play_content(&self, uri: &str) -> Result<(), BraviaError> {
        self.command(&rpc::SET_PLAY_CONTENT, vec![json!({ "uri": uri })])
    }
}
