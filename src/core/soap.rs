//! Partner SOAP API payloads: sObject construction, envelopes and response parsing.

use crate::domain::model::{Credentials, Record};
use crate::utils::error::{Result, StorageError};
use std::collections::HashMap;

pub const SOAPENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const PARTNER_NS: &str = "urn:partner.soap.sforce.com";
pub const SOBJECT_NS: &str = "urn:sobject.partner.soap.sforce.com";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// An `sObjects` element for `create` and `update`.
///
/// Fields without a value, or with an empty one, are dropped when the
/// object is built, so an update only touches the fields that were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SObject {
    entity: String,
    id: Option<String>,
    fields: Vec<(String, String)>,
}

impl SObject {
    pub fn build<I, K, V>(entity: &str, id: Option<&str>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .filter_map(|(name, value)| {
                let value = value?.into();
                if value.is_empty() {
                    None
                } else {
                    Some((name.into(), value))
                }
            })
            .collect();

        Self {
            entity: entity.to_string(),
            id: id.filter(|id| !id.is_empty()).map(str::to_string),
            fields,
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<urn:sObjects>");
        xml.push_str(&format!(
            "<urn1:type>{}</urn1:type>",
            escape_xml(&self.entity)
        ));
        if let Some(id) = &self.id {
            xml.push_str(&format!("<urn1:Id>{}</urn1:Id>", escape_xml(id)));
        }
        for (name, value) in &self.fields {
            xml.push_str(&format!("<{0}>{1}</{0}>", name, escape_xml(value)));
        }
        xml.push_str("</urn:sObjects>");
        xml
    }
}

pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Wraps an operation body in a SOAP 1.1 envelope, with a `SessionHeader` when logged in.
pub fn envelope(session_id: Option<&str>, body: &str) -> String {
    let header = session_id
        .map(|id| {
            format!(
                "<soapenv:Header><urn:SessionHeader><urn:sessionId>{}</urn:sessionId></urn:SessionHeader></soapenv:Header>",
                escape_xml(id)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><soapenv:Envelope xmlns:soapenv="{}" xmlns:urn="{}" xmlns:urn1="{}">{}<soapenv:Body>{}</soapenv:Body></soapenv:Envelope>"#,
        SOAPENV_NS, PARTNER_NS, SOBJECT_NS, header, body
    )
}

pub fn login_body(credentials: &Credentials) -> String {
    format!(
        "<urn:login><urn:username>{}</urn:username><urn:password>{}</urn:password></urn:login>",
        escape_xml(&credentials.username),
        escape_xml(&credentials.password)
    )
}

pub fn create_body(sobject: &SObject) -> String {
    format!("<urn:create>{}</urn:create>", sobject.to_xml())
}

pub fn update_body(sobject: &SObject) -> String {
    format!("<urn:update>{}</urn:update>", sobject.to_xml())
}

pub fn retrieve_body(field_list: &[&str], entity: &str, id: &str) -> String {
    format!(
        "<urn:retrieve><urn:fieldList>{}</urn:fieldList><urn:sObjectType>{}</urn:sObjectType><urn:ids>{}</urn:ids></urn:retrieve>",
        escape_xml(&field_list.join(", ")),
        escape_xml(entity),
        escape_xml(id)
    )
}

pub fn delete_body(id: &str) -> String {
    format!("<urn:delete><urn:ids>{}</urn:ids></urn:delete>", escape_xml(id))
}

/// Returns the fault carried by `xml`, if it parses and holds one.
pub fn fault(xml: &str) -> Option<StorageError> {
    let doc = roxmltree::Document::parse(xml).ok()?;
    let node = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Fault")?;
    Some(fault_error(&node))
}

fn fault_error(node: &roxmltree::Node) -> StorageError {
    let child_text = |name: &str| {
        node.children()
            .find(|c| c.is_element() && c.tag_name().name() == name)
            .and_then(|c| c.text())
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    StorageError::SoapFault {
        code: child_text("faultcode"),
        message: child_text("faultstring"),
    }
}

/// Parses the `result` elements of `<{operation}Response>`.
///
/// Each result is flattened to its leaf elements keyed by local name (first
/// occurrence wins). A nil or empty result yields `None`.
pub fn parse_results(xml: &str, operation: &str) -> Result<Vec<Option<Record>>> {
    let doc = roxmltree::Document::parse(xml)?;

    if let Some(node) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Fault")
    {
        return Err(fault_error(&node));
    }

    let response_tag = format!("{}Response", operation);
    let response = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == response_tag)
        .ok_or_else(|| StorageError::MalformedResponse {
            message: format!("missing <{}> element", response_tag),
        })?;

    Ok(response
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "result")
        .map(|n| collect_record(&n))
        .collect())
}

fn collect_record(node: &roxmltree::Node) -> Option<Record> {
    if node.attribute((XSI_NS, "nil")) == Some("true") {
        return None;
    }

    let mut fields = HashMap::new();
    for desc in node.descendants().skip(1) {
        if desc.is_element() && !desc.children().any(|c| c.is_element()) {
            fields
                .entry(desc.tag_name().name().to_string())
                .or_insert_with(|| desc.text().unwrap_or_default().to_string());
        }
    }

    if fields.is_empty() {
        None
    } else {
        Some(Record { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: [&str; 4] = ["Body", "Type", "Name", "FolderId"];

    fn values() -> [&'static str; 4] {
        ["YWJjZA==", ".txt", "test.txt", "00l000000000001"]
    }

    #[test]
    fn test_build_keeps_field_order_and_id() {
        let sobject = SObject::build(
            "Document",
            Some("015000000000001"),
            FIELDS.iter().zip(values()).map(|(k, v)| (*k, Some(v))),
        );

        assert_eq!(sobject.entity(), "Document");
        assert_eq!(sobject.id(), Some("015000000000001"));
        let names: Vec<&str> = sobject.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, FIELDS);
    }

    #[test]
    fn test_sparse_fields_for_every_subset() {
        for mask in 1u8..(1 << FIELDS.len()) {
            let given: Vec<(&str, Option<String>)> = FIELDS
                .iter()
                .zip(values())
                .enumerate()
                .map(|(i, (name, value))| {
                    let present = mask & (1 << i) != 0;
                    // alternate between None and "" for the falsy values
                    let value = if present {
                        Some(value.to_string())
                    } else if i % 2 == 0 {
                        None
                    } else {
                        Some(String::new())
                    };
                    (*name, value)
                })
                .collect();

            let sobject = SObject::build("Document", Some("015000000000001"), given);
            let xml = sobject.to_xml();

            for (i, name) in FIELDS.iter().enumerate() {
                let present = mask & (1 << i) != 0;
                assert_eq!(sobject.field(name).is_some(), present, "mask {:04b}", mask);
                assert_eq!(xml.contains(&format!("<{}>", name)), present, "mask {:04b}", mask);
            }
            assert_eq!(sobject.fields().len(), mask.count_ones() as usize);
        }
    }

    #[test]
    fn test_to_xml_without_id() {
        let sobject = SObject::build("Document", None, [("Name", Some("a&b.txt"))]);
        assert_eq!(
            sobject.to_xml(),
            "<urn:sObjects><urn1:type>Document</urn1:type><Name>a&amp;b.txt</Name></urn:sObjects>"
        );
    }

    #[test]
    fn test_envelope_session_header() {
        let anonymous = envelope(None, "<urn:login/>");
        assert!(!anonymous.contains("SessionHeader"));

        let authed = envelope(Some("00D!abc"), &delete_body("015000000000001"));
        assert!(authed.contains("<urn:sessionId>00D!abc</urn:sessionId>"));
        assert!(authed.contains("<urn:ids>015000000000001</urn:ids>"));
        assert!(roxmltree::Document::parse(&authed).is_ok());
    }

    #[test]
    fn test_retrieve_body() {
        let body = retrieve_body(&["Body", "Name"], "Document", "015000000000001");
        assert!(body.contains("<urn:fieldList>Body, Name</urn:fieldList>"));
        assert!(body.contains("<urn:sObjectType>Document</urn:sObjectType>"));
    }

    #[test]
    fn test_parse_retrieve_result() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com" xmlns:sf="urn:sobject.partner.soap.sforce.com" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soapenv:Body>
    <retrieveResponse>
      <result xsi:type="sf:sObject">
        <sf:type>Document</sf:type>
        <sf:Id>015000000000001</sf:Id>
        <sf:Body>YWJjZA==</sf:Body>
        <sf:Name>test.txt</sf:Name>
      </result>
    </retrieveResponse>
  </soapenv:Body>
</soapenv:Envelope>"#;

        let results = parse_results(xml, "retrieve").unwrap();
        assert_eq!(results.len(), 1);
        let record = results[0].as_ref().unwrap();
        assert_eq!(record.get("Body"), Some("YWJjZA=="));
        assert_eq!(record.get("Name"), Some("test.txt"));
    }

    #[test]
    fn test_parse_nil_result() {
        let xml = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soapenv:Body><retrieveResponse><result xsi:nil="true"/></retrieveResponse></soapenv:Body>
</soapenv:Envelope>"#;

        let results = parse_results(xml, "retrieve").unwrap();
        assert_eq!(results, vec![None]);
    }

    #[test]
    fn test_parse_fault() {
        let xml = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <soapenv:Fault>
      <faultcode>sf:INVALID_LOGIN</faultcode>
      <faultstring>INVALID_LOGIN: Invalid username, password, security token; or user locked out.</faultstring>
    </soapenv:Fault>
  </soapenv:Body>
</soapenv:Envelope>"#;

        match parse_results(xml, "login") {
            Err(StorageError::SoapFault { code, message }) => {
                assert_eq!(code, "sf:INVALID_LOGIN");
                assert!(message.starts_with("INVALID_LOGIN"));
            }
            other => panic!("expected fault, got {:?}", other),
        }
        assert!(fault(xml).is_some());
        assert!(fault("not xml").is_none());
    }

    #[test]
    fn test_parse_missing_response() {
        let xml = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"><soapenv:Body/></soapenv:Envelope>"#;
        assert!(matches!(
            parse_results(xml, "create"),
            Err(StorageError::MalformedResponse { .. })
        ));
    }
}
