use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorScheme {
    Default,
    Nord,
    Gruvbox,
    Solarized,
}

/// Unit a channel is measured in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Volt,
    Ampere,
    Watt,
    Celsius,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Volt => "V",
            Unit::Ampere => "A",
            Unit::Watt => "W",
            Unit::Celsius => "°C",
        }
    }
}

/// Every tracked telemetry channel, measured or derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    PTotal,
    VMain,
    VShunt,
    ITotal,
    IShunt,
    IAcs712,
    IAcs758,
    IProbe1,
    IProbe2,
    PShunt,
    PAcs712,
    PAcs758,
    PProbe1,
    PProbe2,
    Temp1,
    Temp2,
}

impl Channel {
    /// Display and export order.
    pub const ALL: [Channel; 16] = [
        Channel::PTotal,
        Channel::VMain,
        Channel::VShunt,
        Channel::ITotal,
        Channel::IShunt,
        Channel::IAcs712,
        Channel::IAcs758,
        Channel::IProbe1,
        Channel::IProbe2,
        Channel::PShunt,
        Channel::PAcs712,
        Channel::PAcs758,
        Channel::PProbe1,
        Channel::PProbe2,
        Channel::Temp1,
        Channel::Temp2,
    ];

    /// Key used on the wire and in CSV headers
    pub fn name(self) -> &'static str {
        match self {
            Channel::PTotal => "P_Total",
            Channel::VMain => "V_Main",
            Channel::VShunt => "V_Shunt",
            Channel::ITotal => "I_Total",
            Channel::IShunt => "I_Shunt",
            Channel::IAcs712 => "I_ACS712",
            Channel::IAcs758 => "I_ACS758",
            Channel::IProbe1 => "I_Probe1",
            Channel::IProbe2 => "I_Probe2",
            Channel::PShunt => "P_Shunt",
            Channel::PAcs712 => "P_ACS712",
            Channel::PAcs758 => "P_ACS758",
            Channel::PProbe1 => "P_Probe1",
            Channel::PProbe2 => "P_Probe2",
            Channel::Temp1 => "Temp1",
            Channel::Temp2 => "Temp2",
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            Channel::VMain | Channel::VShunt => Unit::Volt,
            Channel::ITotal
            | Channel::IShunt
            | Channel::IAcs712
            | Channel::IAcs758
            | Channel::IProbe1
            | Channel::IProbe2 => Unit::Ampere,
            Channel::PTotal
            | Channel::PShunt
            | Channel::PAcs712
            | Channel::PAcs758
            | Channel::PProbe1
            | Channel::PProbe2 => Unit::Watt,
            Channel::Temp1 | Channel::Temp2 => Unit::Celsius,
        }
    }

    fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|channel| *channel == self)
            .unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field that was present but could not be read as a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("field {key} is not numeric: {value}")]
pub struct CoercionError {
    pub key: String,
    pub value: Value,
}

/// One telemetry reading as received from the service.
///
/// Values are kept as JSON so that number-or-string fields are coerced at the
/// point of use; unknown keys ride along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySnapshot {
    fields: Map<String, Value>,
    received_at: DateTime<Local>,
}

impl TelemetrySnapshot {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self::with_time(fields, Local::now())
    }

    pub fn with_time(fields: Map<String, Value>, received_at: DateTime<Local>) -> Self {
        Self {
            fields,
            received_at,
        }
    }

    pub fn received_at(&self) -> DateTime<Local> {
        self.received_at
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Read a field as f64. Missing keys are zero; anything present that is
    /// neither a number nor a numeric string is an error.
    pub fn coerce(&self, key: &str) -> Result<f64, CoercionError> {
        match self.fields.get(key) {
            None => Ok(0.0),
            Some(value) => coerce_value(value).ok_or_else(|| CoercionError {
                key: key.to_string(),
                value: value.clone(),
            }),
        }
    }

    /// Same as [`coerce`](Self::coerce) but substitutes zero on failure.
    pub fn value(&self, channel: Channel) -> f64 {
        self.coerce(channel.name()).unwrap_or(0.0)
    }
}

fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// The value of every tracked channel for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Readings {
    values: [f64; 16],
}

impl Readings {
    pub fn get(&self, channel: Channel) -> f64 {
        self.values[channel.position()]
    }

    pub(crate) fn from_parts(
        snapshot: &TelemetrySnapshot,
        mut lookup: impl FnMut(Channel) -> Option<f64>,
    ) -> Self {
        let mut values = [0.0; 16];
        for (slot, channel) in values.iter_mut().zip(Channel::ALL) {
            *slot = lookup(channel).unwrap_or_else(|| snapshot.value(channel));
        }
        Self { values }
    }
}
