use std::fmt;

use indexmap::IndexMap;

use crate::evaluator::{BloodPressure, StandardVital, VitalSign};

/// Evaluators keyed by vital name, plus the optional blood-pressure pair.
pub struct VitalsRegistry {
    evaluators: IndexMap<String, Box<dyn VitalSign>>,
    blood_pressure: Option<BloodPressure>,
}

impl Default for VitalsRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl VitalsRegistry {
    /// Registry without any evaluator.
    pub fn empty() -> Self {
        Self {
            evaluators: IndexMap::new(),
            blood_pressure: None,
        }
    }

    /// Registry holding the default standard evaluators and the blood-pressure pair.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for kind in StandardVital::DEFAULTS {
            registry.register(kind.evaluator());
        }
        registry.set_blood_pressure(BloodPressure::default());
        registry
    }

    /// Inserts the evaluator under its own name, replacing any previous entry.
    pub fn register<V>(&mut self, evaluator: V)
    where
        V: VitalSign + 'static,
    {
        self.register_boxed(Box::new(evaluator));
    }

    pub fn register_boxed(&mut self, evaluator: Box<dyn VitalSign>) {
        let name = evaluator.name().to_string();
        if self.evaluators.insert(name.clone(), evaluator).is_some() {
            tracing::debug!(vital = %name, "Replaced registered evaluator");
        } else {
            tracing::debug!(vital = %name, "Registered evaluator");
        }
    }

    pub fn set_blood_pressure(&mut self, pair: BloodPressure) {
        self.blood_pressure = Some(pair);
    }

    pub fn blood_pressure(&self) -> Option<&BloodPressure> {
        self.blood_pressure.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&dyn VitalSign> {
        self.evaluators.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.evaluators.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.evaluators.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

impl fmt::Debug for VitalsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VitalsRegistry")
            .field("evaluators", &self.evaluators.keys().collect::<Vec<_>>())
            .field("blood_pressure", &self.blood_pressure)
            .finish()
    }
}
