use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::AlertError;

/// Sink for out-of-range vitals.
pub trait Alerter {
    fn alert(&self, vital_name: &str, value: &str, unit: &str) -> Result<(), AlertError>;
}

impl<A: Alerter + ?Sized> Alerter for Rc<A> {
    fn alert(&self, vital_name: &str, value: &str, unit: &str) -> Result<(), AlertError> {
        (**self).alert(vital_name, value, unit)
    }
}

impl<A: Alerter + ?Sized> Alerter for Box<A> {
    fn alert(&self, vital_name: &str, value: &str, unit: &str) -> Result<(), AlertError> {
        (**self).alert(vital_name, value, unit)
    }
}

/// One alert as delivered to a sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertRecord {
    pub vital: String,
    pub value: String,
    pub unit: String,
}

/// Alerter that keeps every alert in memory.
#[derive(Debug, Default)]
pub struct RecordingAlerter {
    records: RefCell<Vec<AlertRecord>>,
}

impl RecordingAlerter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AlertRecord> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl Alerter for RecordingAlerter {
    fn alert(&self, vital_name: &str, value: &str, unit: &str) -> Result<(), AlertError> {
        self.records.borrow_mut().push(AlertRecord {
            vital: vital_name.to_string(),
            value: value.to_string(),
            unit: unit.to_string(),
        });
        Ok(())
    }
}
