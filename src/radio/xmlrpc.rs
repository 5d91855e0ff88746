//! Minimal XML-RPC encoding and response parsing
//!
//! Only scalar values are supported; flrig's `rig.*` methods never return
//! arrays or structs outside of faults.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::RadioError;

/// A scalar XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Double(f64),
    Bool(bool),
    Str(String),
    Nil,
}

impl Value {
    /// Parse element text according to its type tag (`None` = untyped string)
    fn from_typed(type_tag: Option<&str>, text: &str) -> Result<Self, RadioError> {
        let bad = || {
            RadioError::Protocol(format!(
                "bad {} value {text:?}",
                type_tag.unwrap_or("string")
            ))
        };
        match type_tag {
            None | Some("string") => Ok(Value::Str(text.to_string())),
            Some("int") | Some("i4") | Some("i8") => {
                text.trim().parse().map(Value::Int).map_err(|_| bad())
            }
            Some("double") => text.trim().parse().map(Value::Double).map_err(|_| bad()),
            Some("boolean") => match text.trim() {
                "1" => Ok(Value::Bool(true)),
                "0" => Ok(Value::Bool(false)),
                _ => Err(bad()),
            },
            Some("nil") => Ok(Value::Nil),
            Some(other) => Err(RadioError::Protocol(format!(
                "unsupported value type <{other}>"
            ))),
        }
    }

    /// Numeric view; numeric strings are accepted
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => s.trim().parse().ok(),
            Value::Nil => None,
        }
    }

    /// Integer view, rounding doubles
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            other => other.as_f64().map(|f| f.round() as i64),
        }
    }

    /// Boolean view; any non-zero number is true
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            other => other.as_f64().map(|f| f != 0.0),
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Value::Int(i) => out.push_str(&format!("<int>{i}</int>")),
            Value::Double(d) => out.push_str(&format!("<double>{d}</double>")),
            Value::Bool(b) => out.push_str(&format!("<boolean>{}</boolean>", u8::from(*b))),
            Value::Str(s) => out.push_str(&format!("<string>{}</string>", escape(s.as_str()))),
            Value::Nil => out.push_str("<nil/>"),
        }
    }

    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

/// Build a `methodCall` document
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param><value>");
        param.write_to(&mut out);
        out.push_str("</value></param>");
    }
    out.push_str("</params></methodCall>\n");
    out
}

/// Parse a `methodResponse` document.
///
/// Returns the first parameter value, [`Value::Nil`] for an empty response,
/// or [`RadioError::Fault`] with the fault string.
pub fn parse_response(body: &str) -> Result<Value, RadioError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut in_fault = false;
    let mut in_value = false;
    let mut type_tag: Option<String> = None;
    let mut fault_string: Option<String> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| RadioError::Protocol(e.to_string()))?;
        match event {
            Event::Start(element) => {
                let name = tag_name(element.local_name().as_ref());
                match name.as_str() {
                    "fault" => in_fault = true,
                    "value" => {
                        in_value = true;
                        type_tag = None;
                    }
                    _ if in_value => type_tag = Some(name),
                    _ => {}
                }
            }
            Event::Empty(element) => {
                let name = tag_name(element.local_name().as_ref());
                if in_fault {
                    continue;
                }
                match name.as_str() {
                    "value" => return Ok(Value::Str(String::new())),
                    "nil" if in_value => return Ok(Value::Nil),
                    _ if in_value => return Value::from_typed(Some(name.as_str()), ""),
                    _ => {}
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| RadioError::Protocol(e.to_string()))?;
                if in_fault {
                    if in_value && type_tag.as_deref() == Some("string") {
                        fault_string = Some(text.into_owned());
                    }
                } else if in_value {
                    return Value::from_typed(type_tag.as_deref(), &text);
                }
            }
            Event::End(element) => {
                let name = tag_name(element.local_name().as_ref());
                if name == "value" {
                    if in_value && !in_fault {
                        // <value></value> or <value><string></string></value>
                        return Value::from_typed(type_tag.as_deref(), "");
                    }
                    in_value = false;
                    type_tag = None;
                } else if type_tag.as_deref() == Some(name.as_str()) {
                    type_tag = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if in_fault {
        return Err(RadioError::Fault(
            fault_string.unwrap_or_else(|| "unknown fault".to_string()),
        ));
    }
    Ok(Value::Nil)
}

/// Error for a value that could not be converted to what `method` returns
pub fn unexpected(method: &'static str, value: &Value) -> RadioError {
    RadioError::UnexpectedValue {
        method,
        value: value.describe(),
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<methodResponse><params><param>\n\t<value>{value}</value>\n</param></params></methodResponse>"
        )
    }

    #[test]
    fn test_encode_call() {
        let body = encode_call("rig.set_vfo", &[Value::Double(14074000.0)]);
        assert!(body.contains("<methodName>rig.set_vfo</methodName>"));
        assert!(body.contains("<param><value><double>14074000</double></value></param>"));
    }

    #[test]
    fn test_encode_no_params() {
        let body = encode_call("rig.get_vfo", &[]);
        assert!(body.contains("<params></params>"));
    }

    #[test]
    fn test_encode_escapes_strings() {
        let body = encode_call("rig.set_mode", &[Value::Str("A&B".into())]);
        assert!(body.contains("<string>A&amp;B</string>"));
    }

    #[test]
    fn test_parse_untyped_string() {
        let value = parse_response(&response("14074000")).unwrap();
        assert_eq!(value, Value::Str("14074000".into()));
        assert_eq!(value.as_i64(), Some(14_074_000));
    }

    #[test]
    fn test_parse_typed_scalars() {
        assert_eq!(parse_response(&response("<i4>42</i4>")).unwrap(), Value::Int(42));
        assert_eq!(parse_response(&response("<int>-3</int>")).unwrap(), Value::Int(-3));
        assert_eq!(
            parse_response(&response("<double>7074000.5</double>")).unwrap(),
            Value::Double(7_074_000.5)
        );
        assert_eq!(
            parse_response(&response("<boolean>1</boolean>")).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            parse_response(&response("<string>USB-D</string>")).unwrap(),
            Value::Str("USB-D".into())
        );
    }

    #[test]
    fn test_parse_empty_values() {
        assert_eq!(parse_response(&response("")).unwrap(), Value::Str(String::new()));
        assert_eq!(
            parse_response(&response("<string></string>")).unwrap(),
            Value::Str(String::new())
        );
        assert_eq!(parse_response(&response("<nil/>")).unwrap(), Value::Nil);
    }

    #[test]
    fn test_parse_no_params() {
        let body = "<?xml version=\"1.0\"?><methodResponse><params></params></methodResponse>";
        assert_eq!(parse_response(body).unwrap(), Value::Nil);
    }

    #[test]
    fn test_parse_fault() {
        let body = r#"<?xml version="1.0"?>
<methodResponse><fault><value><struct>
<member><name>faultCode</name><value><int>-1</int></value></member>
<member><name>faultString</name><value><string>rig.nope: unknown method name</string></value></member>
</struct></value></fault></methodResponse>"#;
        match parse_response(body) {
            Err(RadioError::Fault(msg)) => assert_eq!(msg, "rig.nope: unknown method name"),
            other => panic!("Expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_bad_int() {
        assert!(matches!(
            parse_response(&response("<int>abc</int>")),
            Err(RadioError::Protocol(_))
        ));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::Double(12.6).as_i64(), Some(13));
        assert_eq!(Value::Int(0).as_bool(), Some(false));
        assert_eq!(Value::Str("1".into()).as_bool(), Some(true));
        assert_eq!(Value::Str("USB".into()).as_f64(), None);
        assert_eq!(Value::Nil.as_i64(), None);
    }
}
