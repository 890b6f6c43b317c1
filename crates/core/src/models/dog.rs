use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDog {
    pub name: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
}

/// Partial update of a dog profile.
///
/// `breed` and `age` distinguish "field absent" (`None`) from "field set to
/// null" (`Some(None)`), so a client can clear them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DogChanges {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub breed: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Option<i32>>,
}

impl DogChanges {
    pub fn apply(&self, dog: &mut Dog) {
        if let Some(name) = &self.name {
            dog.name = name.clone();
        }
        if let Some(breed) = &self.breed {
            dog.breed = breed.clone();
        }
        if let Some(age) = self.age {
            dog.age = age;
        }
    }
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Outcome of a dog deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DogRemoval {
    Deleted,
    /// An appointment, upcoming or cancelled, still references the dog.
    InUse,
    Missing,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDogRequest {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogResponse {
    pub id: Uuid,
    pub name: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
}

impl From<Dog> for DogResponse {
    fn from(dog: Dog) -> Self {
        Self {
            id: dog.id,
            name: dog.name,
            breed: dog.breed,
            age: dog.age,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DogEnvelope {
    pub message: String,
    pub dog: DogResponse,
}
