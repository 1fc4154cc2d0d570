//! Sample families used by the getting-started walkthrough

use super::family::{Address, Child, Family, Parent};

/// The Andersen family (`Andersen.1`), not registered
pub fn andersen_family() -> Family {
    Family {
        id: "Andersen.1".to_string(),
        last_name: "Andersen".to_string(),
        parents: vec![Parent::new("Thomas"), Parent::new("Mary Kay")],
        children: vec![Child::new("Henriette Thaulow", "female", 5).with_pet("Fluffy")],
        address: Address {
            state: "WA".to_string(),
            county: "King".to_string(),
            city: "Seattle".to_string(),
        },
        is_registered: false,
    }
}

/// The Wakefield family (`Wakefield.7`), registered
pub fn wakefield_family() -> Family {
    Family {
        id: "Wakefield.7".to_string(),
        last_name: "Wakefield".to_string(),
        parents: vec![
            Parent::new("Robin").with_family_name("Wakefield"),
            Parent::new("Ben").with_family_name("Miller"),
        ],
        children: vec![
            Child::new("Jesse", "female", 8)
                .with_family_name("Merriam")
                .with_pet("Goofy")
                .with_pet("Shadow"),
            Child::new("Lisa", "female", 1).with_family_name("Miller"),
        ],
        address: Address {
            state: "NY".to_string(),
            county: "Manhattan".to_string(),
            city: "NY".to_string(),
        },
        is_registered: true,
    }
}
