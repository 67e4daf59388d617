#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    pub id: u32,
    pub name: &'static str,
    pub price: &'static str,
}

pub const CATALOG: &[Service] = &[
    Service {
        id: 1,
        name: "Men's haircut",
        price: "80,000 UZS",
    },
    Service {
        id: 2,
        name: "Beard",
        price: "50,000 UZS",
    },
    Service {
        id: 3,
        name: "Haircut + styling",
        price: "100,000 UZS",
    },
    Service {
        id: 4,
        name: "Hair colouring",
        price: "150,000 UZS",
    },
];

pub fn find(id: u32) -> Option<&'static Service> {
    CATALOG.iter().find(|s| s.id == id)
}

/// Names of the selected services in catalog order. Unknown ids are skipped.
pub fn names_for(ids: &[u32]) -> Vec<String> {
    CATALOG
        .iter()
        .filter(|s| ids.contains(&s.id))
        .map(|s| s.name.to_string())
        .collect()
}
