use serde_json::{Value, json};

use crate::{client::Client, errors::BraviaError, rpc};

impl Client {
    pub fn application_status_list(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_APPLICATION_STATUS_LIST, Vec::new())
    }

    // Most sets answer 40005 unless a text field has focus.
    pub fn text_form(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_TEXT_FORM, vec![json!({})])
    }

    /// Whether the built-in web browser is open.
    pub fn web_app_status(&self) -> Result<Value, BraviaError> {
        self.query(&rpc::GET_WEB_APP_STATUS, Vec::new())
    }
}
