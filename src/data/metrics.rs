use crate::data::snapshot::{Channel, CoercionError, Readings, TelemetrySnapshot};
use std::collections::BTreeMap;

/// Power values computed per measured current channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedPowers {
    values: BTreeMap<Channel, f64>,
}

impl DerivedPowers {
    pub fn get(&self, channel: Channel) -> Option<f64> {
        self.values.get(&channel).copied()
    }
}

/// Compute voltage × current for every probe. A single non-numeric input
/// yields an empty result rather than a partial one.
pub fn derive_powers(snapshot: &TelemetrySnapshot) -> DerivedPowers {
    match try_derive(snapshot) {
        Ok(values) => DerivedPowers { values },
        Err(err) => {
            tracing::debug!("derived powers skipped: {}", err);
            DerivedPowers::default()
        }
    }
}

fn try_derive(snapshot: &TelemetrySnapshot) -> Result<BTreeMap<Channel, f64>, CoercionError> {
    let v_main = snapshot.coerce(Channel::VMain.name())?;
    let v_shunt = snapshot.coerce(Channel::VShunt.name())?;

    let pairs = [
        (Channel::PShunt, v_shunt, Channel::IShunt),
        (Channel::PAcs712, v_main, Channel::IAcs712),
        (Channel::PAcs758, v_main, Channel::IAcs758),
        (Channel::PProbe1, v_main, Channel::IProbe1),
        (Channel::PProbe2, v_main, Channel::IProbe2),
    ];

    let mut values = BTreeMap::new();
    for (power, voltage, current) in pairs {
        values.insert(power, voltage * snapshot.coerce(current.name())?);
    }
    Ok(values)
}

/// V_Main × I_Total, with non-numeric inputs read as zero.
pub fn total_power(snapshot: &TelemetrySnapshot) -> f64 {
    snapshot.value(Channel::VMain) * snapshot.value(Channel::ITotal)
}

/// Merge raw fields, derived powers and total power into one value per
/// tracked channel. Derived values win over same-named raw fields.
pub fn readings(snapshot: &TelemetrySnapshot) -> Readings {
    let powers = derive_powers(snapshot);
    let p_total = total_power(snapshot);
    Readings::from_parts(snapshot, |channel| match channel {
        Channel::PTotal => Some(p_total),
        other => powers.get(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn snapshot(value: Value) -> TelemetrySnapshot {
        match value {
            Value::Object(map) => TelemetrySnapshot::new(map),
            _ => panic!("test snapshot must be an object"),
        }
    }

    fn example() -> TelemetrySnapshot {
        snapshot(json!({
            "V_Main": 12.0, "I_Total": 2.0, "V_Shunt": 0.1, "I_Shunt": 0.5,
            "I_ACS712": 1.0, "I_ACS758": 0.8, "I_Probe1": 0.3, "I_Probe2": 0.2
        }))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_example_snapshot_powers() {
        let s = example();
        let powers = derive_powers(&s);
        assert!(Channel::ALL[9..14].iter().all(|c| powers.get(*c).is_some()));
        assert_close(total_power(&s), 24.0);
        assert_close(powers.get(Channel::PShunt).unwrap(), 0.05);
        assert_close(powers.get(Channel::PAcs712).unwrap(), 12.0);
        assert_close(powers.get(Channel::PAcs758).unwrap(), 9.6);
        assert_close(powers.get(Channel::PProbe1).unwrap(), 3.6);
        assert_close(powers.get(Channel::PProbe2).unwrap(), 2.4);
    }

    #[test]
    fn test_powers_match_formulas_exactly() {
        let s = snapshot(json!({
            "V_Main": 230.7, "I_Total": 1.3, "V_Shunt": "0.075", "I_Shunt": 4.1,
            "I_ACS712": 0.9, "I_ACS758": 2.2, "I_Probe1": 0.1, "I_Probe2": 7
        }));
        let powers = derive_powers(&s);
        assert_eq!(total_power(&s), 230.7 * 1.3);
        assert_eq!(powers.get(Channel::PShunt), Some(0.075 * 4.1));
        assert_eq!(powers.get(Channel::PAcs712), Some(230.7 * 0.9));
        assert_eq!(powers.get(Channel::PAcs758), Some(230.7 * 2.2));
        assert_eq!(powers.get(Channel::PProbe1), Some(230.7 * 0.1));
        assert_eq!(powers.get(Channel::PProbe2), Some(230.7 * 7.0));
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let s = snapshot(json!({"V_Main": 10.0, "I_ACS712": 2.0}));
        let powers = derive_powers(&s);
        assert_eq!(powers.get(Channel::PAcs712), Some(20.0));
        assert_eq!(powers.get(Channel::PShunt), Some(0.0));
        assert_eq!(total_power(&s), 0.0);
    }

    #[test]
    fn test_non_numeric_input_yields_empty_set() {
        let s = snapshot(json!({"V_Main": 12.0, "I_Probe2": "broken"}));
        let powers = derive_powers(&s);
        assert_eq!(powers, DerivedPowers::default());
    }

    #[test]
    fn test_readings_merge_raw_and_derived() {
        let mut s = example();
        let r = readings(&s);
        assert_close(r.get(Channel::PTotal), 24.0);
        assert_close(r.get(Channel::PAcs758), 9.6);
        assert_eq!(r.get(Channel::VMain), 12.0);
        assert_eq!(r.get(Channel::Temp1), 0.0);

        // an empty derived set falls back to whatever the service sent
        s = snapshot(json!({"V_Main": "x", "P_Probe1": 5.5, "I_Total": 2.0}));
        let r = readings(&s);
        assert_eq!(r.get(Channel::PProbe1), 5.5);
        assert_eq!(r.get(Channel::PShunt), 0.0);
        assert_eq!(r.get(Channel::VMain), 0.0);
        assert_eq!(r.get(Channel::PTotal), 0.0);
    }
}
