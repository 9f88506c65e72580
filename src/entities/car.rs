//! CAR record - a chassis owned by a team

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{CarId, RecordKind, TeamId};

/// Canonical classification of the store's free-form car status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarStatusClass {
    /// `active` or `operational`
    Operational,
    /// `maintenance` or `service`
    Service,
    /// `retired` or `inactive`
    Retired,
    /// Anything else, including an empty status
    Other,
}

impl CarStatusClass {
    /// Classify a raw status string (case-insensitive, surrounding whitespace ignored)
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "active" | "operational" => CarStatusClass::Operational,
            "maintenance" | "service" => CarStatusClass::Service,
            "retired" | "inactive" => CarStatusClass::Retired,
            _ => CarStatusClass::Other,
        }
    }
}

impl std::fmt::Display for CarStatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CarStatusClass::Operational => write!(f, "operational"),
            CarStatusClass::Service => write!(f, "service"),
            CarStatusClass::Retired => write!(f, "retired"),
            CarStatusClass::Other => write!(f, "other"),
        }
    }
}

/// Race car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Store key
    pub car_id: CarId,

    /// Race number (unique within a team-season, not enforced)
    pub car_number: i64,

    /// Chassis number
    pub chassis_number: String,

    /// Current status as recorded by the store
    #[serde(default)]
    pub status: String,

    /// Owning team
    pub team: TeamId,
}

impl Entity for Car {
    const KIND: RecordKind = RecordKind::Car;

    fn key(&self) -> i64 {
        self.car_id.get()
    }

    fn label(&self) -> String {
        format!("Car #{} - {}", self.car_number, self.chassis_number)
    }
}

impl Car {
    /// Canonical status class
    pub fn status_class(&self) -> CarStatusClass {
        CarStatusClass::from_status(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(CarStatusClass::from_status("Active"), CarStatusClass::Operational);
        assert_eq!(CarStatusClass::from_status("OPERATIONAL"), CarStatusClass::Operational);
        assert_eq!(CarStatusClass::from_status("maintenance"), CarStatusClass::Service);
        assert_eq!(CarStatusClass::from_status(" Service "), CarStatusClass::Service);
        assert_eq!(CarStatusClass::from_status("retired"), CarStatusClass::Retired);
        assert_eq!(CarStatusClass::from_status("Inactive"), CarStatusClass::Retired);
        assert_eq!(CarStatusClass::from_status("crashed"), CarStatusClass::Other);
        assert_eq!(CarStatusClass::from_status(""), CarStatusClass::Other);
    }

    #[test]
    fn test_car_deserialization() {
        let yaml = r#"
car_id: 7
car_number: 44
chassis_number: "CH-044"
status: "active"
team: 2
"#;
        let car: Car = serde_yml::from_str(yaml).unwrap();
        assert_eq!(car.car_id, CarId(7));
        assert_eq!(car.team, TeamId(2));
        assert_eq!(car.status_class(), CarStatusClass::Operational);
        assert_eq!(car.label(), "Car #44 - CH-044");
    }
}
