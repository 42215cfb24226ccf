//! Sensors: the agent's perception of its environment.
//!
//! Once per driver tick every registered sensor reads the live environment
//! and writes what it observed into the [`WorldState`]. A sensor must write
//! a determinate value for every key it owns, so planning never sees a
//! half-updated state.
//!
//! This module provides:
//! - [`Sensor`]: the observation contract
//! - [`Sensors`]: an ordered collection with unique names
//! - [`FnSensor`]: a sensor built from a closure
//!
//! # Example
//!
//! ```
//! use goap_engine::{FnSensor, Sensors, StateKey, ValueKind, WorldState};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
//! enum Fact {
//!     Health,
//! }
//!
//! impl StateKey for Fact {
//!     fn kind(&self) -> ValueKind {
//!         ValueKind::Int
//!     }
//! }
//!
//! let mut sensors = Sensors::new();
//! sensors.add(FnSensor::new("health", |state: &mut WorldState<Fact>| {
//!     state.set_int(Fact::Health, 99);
//!     Ok(())
//! }))?;
//!
//! let mut state = WorldState::new();
//! sensors.run_all(&mut state)?;
//! assert_eq!(state.get_int(Fact::Health), 99);
//! # Ok::<(), goap_engine::GoapError>(())
//! ```

use std::fmt;

use crate::error::{GoapError, Result};
use crate::value::StateKey;
use crate::world_state::WorldState;

/// Reads part of the environment into the world state.
pub trait Sensor<K: StateKey> {
    fn name(&self) -> &str;

    /// Writes the current observation into `state`.
    fn sense(&mut self, state: &mut WorldState<K>) -> Result<()>;
}

/// An ordered collection of sensors with unique names.
pub struct Sensors<K: StateKey> {
    sensors: Vec<Box<dyn Sensor<K>>>,
}

impl<K: StateKey> Sensors<K> {
    pub fn new() -> Self {
        Self {
            sensors: Vec::new(),
        }
    }

    /// Adds a sensor.
    ///
    /// # Errors
    ///
    /// Returns [`GoapError::SensorAlreadyInCollection`] if a sensor with the
    /// same name is already registered.
    pub fn add(&mut self, sensor: impl Sensor<K> + 'static) -> Result<()> {
        if self.get(sensor.name()).is_some() {
            return Err(GoapError::SensorAlreadyInCollection(
                sensor.name().to_string(),
            ));
        }

        self.sensors.push(Box::new(sensor));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Sensor<K>> {
        self.sensors
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Removes a sensor by name. Returns true if a sensor was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let initial_len = self.sensors.len();
        self.sensors.retain(|s| s.name() != name);
        self.sensors.len() != initial_len
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sensors.iter().map(|s| s.name()).collect()
    }

    /// Runs every sensor in insertion order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`GoapError::Sensor`] naming the sensor that failed.
    pub fn run_all(&mut self, state: &mut WorldState<K>) -> Result<()> {
        for sensor in self.sensors.iter_mut() {
            if let Err(err) = sensor.sense(state) {
                let name = sensor.name().to_string();
                log::warn!("Sensor {} failed: {}", name, err);
                return Err(match err {
                    err @ GoapError::Sensor { .. } => err,
                    other => GoapError::Sensor {
                        name,
                        reason: other.to_string(),
                    },
                });
            }
        }
        log::trace!("Sensed {}", state);
        Ok(())
    }
}

impl<K: StateKey> Default for Sensors<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateKey> fmt::Debug for Sensors<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<K: StateKey> fmt::Display for Sensors<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.names())
    }
}

/// A sensor backed by a closure.
pub struct FnSensor<F> {
    name: String,
    func: F,
}

impl<F> FnSensor<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<K, F> Sensor<K> for FnSensor<F>
where
    K: StateKey,
    F: FnMut(&mut WorldState<K>) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn sense(&mut self, state: &mut WorldState<K>) -> Result<()> {
        (self.func)(state)
    }
}

impl<F> fmt::Debug for FnSensor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSensor").field("name", &self.name).finish()
    }
}
