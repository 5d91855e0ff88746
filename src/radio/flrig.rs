//! flrig XML-RPC client

use std::time::Duration;

use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::trace;

use super::xmlrpc::{self, Value};
use super::{RadioError, RadioLink};

/// Default flrig XML-RPC endpoint
pub const DEFAULT_URL: &str = "http://127.0.0.1:12345/RPC2";

/// [`RadioLink`] over flrig's XML-RPC server.
///
/// Calls are serialized: the gate is held for the whole request/response
/// exchange, so at most one call is in flight no matter how many threads
/// share the client.
pub struct FlrigClient {
    http: Client,
    url: String,
    gate: Mutex<()>,
}

impl FlrigClient {
    /// Create a client; `timeout` bounds each call end to end
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RadioError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
            gate: Mutex::new(()),
        })
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn call(&self, method: &'static str, params: &[Value]) -> Result<Value, RadioError> {
        let body = xmlrpc::encode_call(method, params);

        let _guard = self.gate.lock();
        trace!(method, "xml-rpc call");
        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()?;

        if !response.status().is_success() {
            return Err(RadioError::HttpStatus(response.status().as_u16()));
        }
        let text = response.text()?;
        let value = xmlrpc::parse_response(&text)?;
        trace!(method, ?value, "xml-rpc reply");
        Ok(value)
    }

    fn call_i32(&self, method: &'static str) -> Result<i32, RadioError> {
        let value = self.call(method, &[])?;
        value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| xmlrpc::unexpected(method, &value))
    }
}

impl RadioLink for FlrigClient {
    fn get_vfo(&self) -> Result<u64, RadioError> {
        let value = self.call("rig.get_vfo", &[])?;
        value
            .as_f64()
            .filter(|hz| *hz >= 0.0)
            .map(|hz| hz.round() as u64)
            .ok_or_else(|| xmlrpc::unexpected("rig.get_vfo", &value))
    }

    fn set_vfo(&self, hz: u64) -> Result<(), RadioError> {
        self.call("rig.set_vfo", &[Value::Double(hz as f64)])?;
        Ok(())
    }

    fn get_ptt(&self) -> Result<bool, RadioError> {
        let value = self.call("rig.get_ptt", &[])?;
        value
            .as_bool()
            .ok_or_else(|| xmlrpc::unexpected("rig.get_ptt", &value))
    }

    fn set_ptt(&self, on: bool) -> Result<(), RadioError> {
        self.call("rig.set_verify_ptt", &[Value::Int(i64::from(on))])?;
        Ok(())
    }

    fn get_power(&self) -> Result<i32, RadioError> {
        self.call_i32("rig.get_power")
    }

    fn set_power(&self, power: i32) -> Result<(), RadioError> {
        self.call("rig.set_verify_power", &[Value::Int(i64::from(power))])?;
        Ok(())
    }

    fn get_mic_gain(&self) -> Result<i32, RadioError> {
        self.call_i32("rig.get_micgain")
    }

    fn set_mic_gain(&self, gain: i32) -> Result<(), RadioError> {
        self.call("rig.set_verify_micgain", &[Value::Int(i64::from(gain))])?;
        Ok(())
    }

    fn get_mode(&self) -> Result<String, RadioError> {
        match self.call("rig.get_mode", &[])? {
            Value::Str(mode) => Ok(mode),
            other => Err(xmlrpc::unexpected("rig.get_mode", &other)),
        }
    }

    fn get_split(&self) -> Result<i32, RadioError> {
        self.call_i32("rig.get_split")
    }

    fn set_split(&self, split: i32) -> Result<(), RadioError> {
        self.call("rig.set_split", &[Value::Int(i64::from(split))])?;
        Ok(())
    }
}
