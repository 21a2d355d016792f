//! IRCC: remote-control button presses sent as a SOAP action.

use std::time::Duration;

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::errors::BraviaError;

pub const IRCC_SERVICE_TYPE: &str = "urn:schemas-sony-com:service:IRCC:1";
pub const IRCC_ACTION: &str = "X_SendIRCC";
pub const IRCC_TIMEOUT: Duration = Duration::from_secs(10);

const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP_ENCODING: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// `"urn:schemas-sony-com:service:IRCC:1#X_SendIRCC"`, quotes included.
pub fn soap_action_header() -> String {
    format!(r#""{}#{}""#, IRCC_SERVICE_TYPE, IRCC_ACTION)
}

/// Builds the `X_SendIRCC` envelope carrying `code`.
pub fn build_ircc_envelope(code: &str) -> Result<String, BraviaError> {
    let mut ircc_code = Element::new("IRCCCode");
    ircc_code.children.push(XMLNode::Text(code.to_string()));

    let mut action = Element::new(&format!("u:{}", IRCC_ACTION));
    action
        .attributes
        .insert("xmlns:u".to_string(), IRCC_SERVICE_TYPE.to_string());
    action.children.push(XMLNode::Element(ircc_code));

    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(action));

    let mut envelope = Element::new("s:Envelope");
    envelope
        .attributes
        .insert("xmlns:s".to_string(), SOAP_ENVELOPE_NS.to_string());
    envelope
        .attributes
        .insert("s:encodingStyle".to_string(), SOAP_ENCODING.to_string());
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(false);
    envelope
        .write_with_config(&mut buf, config)
        .map_err(|e| BraviaError::Xml(e.to_string()))?;

    String::from_utf8(buf).map_err(|e| BraviaError::Xml(e.to_string()))
}

/// UPnP error carried by a SOAP fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrccFault {
    pub error_code: u32,
    pub error_description: String,
}

/// Extracts `Fault/detail/UPnPError` from a response body, if any.
pub fn parse_fault(body: &str) -> Option<IrccFault> {
    let envelope = Element::parse(body.as_bytes()).ok()?;
    let soap_body = find_child_with_suffix(&envelope, "Body")?;
    let fault = find_child_with_suffix(soap_body, "Fault")?;
    let detail = find_child_with_suffix(fault, "detail")?;
    let upnp_error = find_child_with_suffix(detail, "UPnPError")?;

    let error_code = child_text(upnp_error, "errorCode")?.parse::<u32>().ok()?;
    let error_description = child_text(upnp_error, "errorDescription").unwrap_or_default();

    Some(IrccFault {
        error_code,
        error_description,
    })
}

fn find_child_with_suffix<'a>(parent: &'a Element, suffix: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if elem.name.ends_with(suffix) => Some(elem),
        _ => None,
    })
}

fn child_text(parent: &Element, suffix: &str) -> Option<String> {
    find_child_with_suffix(parent, suffix)?
        .get_text()
        .map(|t| t.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_code_and_namespaces() {
        let xml = build_ircc_envelope("AAAAAQAAAAEAAAAVAw==").unwrap();
        assert!(xml.contains("<IRCCCode>AAAAAQAAAAEAAAAVAw==</IRCCCode>"));
        assert!(xml.contains(r#"xmlns:u="urn:schemas-sony-com:service:IRCC:1""#));
        assert!(xml.contains(r#"xmlns:s="http://schemas.xmlsoap.org/soap/envelope/""#));
        assert!(xml.contains("X_SendIRCC"));
    }

    #[test]
    fn soap_action_is_quoted() {
        assert_eq!(
            soap_action_header(),
            "\"urn:schemas-sony-com:service:IRCC:1#X_SendIRCC\""
        );
    }

    #[test]
    fn fault_is_parsed() {
        let body = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <s:Fault>
      <faultcode>s:Client</faultcode>
      <faultstring>UPnPError</faultstring>
      <detail>
        <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
          <errorCode>401</errorCode>
          <errorDescription>Invalid Action</errorDescription>
        </UPnPError>
      </detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;
        let fault = parse_fault(body).unwrap();
        assert_eq!(fault.error_code, 401);
        assert_eq!(fault.error_description, "Invalid Action");
    }

    #[test]
    fn plain_body_is_not_a_fault() {
        assert!(parse_fault("").is_none());
        assert!(parse_fault("<ok/>").is_none());
    }
}
