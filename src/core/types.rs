use std::fmt;
use serde::{Serialize, Deserialize};

/// Cache namespace. `Nutrition` is a sub-kind of the food domain: it lives in
/// the food directory and is told apart by its filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Food,
    Exercise,
    Nutrition,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Food => "food",
            Domain::Exercise => "exercise",
            Domain::Nutrition => "nutrition",
        }
    }

    /// Subdirectory under the cache root that holds this domain's files.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Domain::Food | Domain::Nutrition => "food",
            Domain::Exercise => "exercise",
        }
    }

    pub fn file_prefix(&self) -> &'static str {
        match self {
            Domain::Nutrition => "nutrition_",
            Domain::Food | Domain::Exercise => "",
        }
    }

    /// Whether a file name inside `dir_name()` belongs to this domain.
    pub fn owns_file(&self, file_name: &str) -> bool {
        match self {
            Domain::Nutrition => file_name.starts_with("nutrition_"),
            Domain::Food => !file_name.starts_with("nutrition_"),
            Domain::Exercise => true,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub food_id: String,
    pub name: String,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
}

impl FoodItem {
    pub fn new(food_id: impl Into<String>, name: impl Into<String>) -> Self {
        FoodItem {
            food_id: food_id.into(),
            name: name.into(),
            category: None,
            manufacturer: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseItem {
    pub exercise_id: Option<String>,
    pub name: String,
    pub description: String,
    pub met_value: f64,
    pub category: Option<String>,
}

impl ExerciseItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>, met_value: f64) -> Self {
        ExerciseItem {
            exercise_id: None,
            name: name.into(),
            description: description.into(),
            met_value,
            category: None,
        }
    }
}

/// Per-100g nutrition record for one food item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    pub food: FoodItem,
    pub calories_per_100g: f64,
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sodium: Option<f64>,
}

/// Value stored in a cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CachePayload {
    Foods(Vec<FoodItem>),
    Exercises(Vec<ExerciseItem>),
    Nutrition(NutritionInfo),
}

impl CachePayload {
    pub fn len(&self) -> usize {
        match self {
            CachePayload::Foods(items) => items.len(),
            CachePayload::Exercises(items) => items.len(),
            CachePayload::Nutrition(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
