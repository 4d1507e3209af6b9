//! Circuit validation.

use tracing::debug;

use crate::error::{ConnectionError, Result};

use super::{Circuit, Direction, PinId};

/// Validate a circuit's wiring.
///
/// Checks:
/// - Every edge is recorded on both ends
/// - Every edge runs output to input between pins of the same polarity
///
/// Unconnected inputs are legal (they read unknown) and are only logged.
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    for id in circuit.component_ids() {
        for &input in circuit.inputs(id) {
            let Some(pin) = circuit.pin(input) else {
                return Err(ConnectionError::UnknownPin { pin: input }.into());
            };
            let Some(driver) = pin.driver() else {
                continue;
            };
            let source = circuit.pin(driver).ok_or(ConnectionError::UnknownPin { pin: driver })?;
            if source.direction() != Direction::Out {
                return Err(ConnectionError::Direction {
                    pin: driver,
                    expected: Direction::Out,
                    actual: source.direction(),
                }
                .into());
            }
            if !source.fanout().contains(&input) {
                return Err(ConnectionError::UnknownPin { pin: input }.into());
            }
            if !source.kind().same_polarity(pin.kind()) {
                return Err(ConnectionError::PolarityMismatch {
                    from: driver,
                    to: input,
                    from_kind: source.kind(),
                    to_kind: pin.kind(),
                }
                .into());
            }
        }
    }

    let floating = floating_inputs(circuit);
    if !floating.is_empty() {
        debug!(circuit = circuit.name(), count = floating.len(), "unconnected inputs");
    }
    Ok(())
}

/// Input pins with no driver.
pub fn floating_inputs(circuit: &Circuit) -> Vec<PinId> {
    circuit
        .component_ids()
        .flat_map(|id| circuit.inputs(id).iter().copied())
        .filter(|pin| circuit.pin(*pin).map_or(false, |p| p.driver().is_none()))
        .collect()
}
