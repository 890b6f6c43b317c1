use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

/// The catalogue a fresh database is seeded with.
pub fn default_catalogue() -> Vec<NewService> {
    [
        ("Full Grooming", "Includes a bath, brush, haircut, nail trim, and ear cleaning.", 85.0),
        ("Bath & Brush", "A refreshing bath and thorough brushing.", 50.0),
        ("Taglio", "Taglio personalizzato per il tuo cane.", 60.0),
        ("Toelettatura Completa", "Bagno e taglio combinati.", 79.0),
        ("Nail Trim", "Quick and precise nail trimming.", 20.0),
        ("Extra", "Servizi aggiuntivi come pulizia denti.", 25.0),
    ]
    .into_iter()
    .map(|(name, description, price)| NewService {
        name: name.to_string(),
        description: Some(description.to_string()),
        price,
    })
    .collect()
}
