//! Static geocoder for tests and offline runs.

use async_trait::async_trait;

use crate::domain::opinion::Coordinates;
use crate::ports::{GeocodeError, Geocoder};

/// A geocoder that always answers the same way.
#[derive(Debug, Clone)]
pub struct StaticGeocoder {
    behavior: Behavior,
}

#[derive(Debug, Clone)]
enum Behavior {
    At(Coordinates),
    NotFound,
    Error(GeocodeError),
}

impl StaticGeocoder {
    /// Resolves every place to the given coordinates.
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            behavior: Behavior::At(coordinates),
        }
    }

    /// Resolves no place at all.
    pub fn not_found() -> Self {
        Self {
            behavior: Behavior::NotFound,
        }
    }

    /// Fails every resolution with the given error.
    pub fn erroring(error: GeocodeError) -> Self {
        Self {
            behavior: Behavior::Error(error),
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn resolve(&self, _place: &str) -> Result<Option<Coordinates>, GeocodeError> {
        match &self.behavior {
            Behavior::At(coordinates) => Ok(Some(*coordinates)),
            Behavior::NotFound => Ok(None),
            Behavior::Error(error) => Err(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_coordinates_are_returned() {
        let geocoder = StaticGeocoder::at(Coordinates::new(1.5, 2.5));
        let resolved = geocoder.resolve("anywhere").await.unwrap();
        assert_eq!(resolved, Some(Coordinates::new(1.5, 2.5)));
    }

    #[tokio::test]
    async fn not_found_resolves_to_none() {
        let geocoder = StaticGeocoder::not_found();
        assert_eq!(geocoder.resolve("anywhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn erroring_fails_every_call() {
        let geocoder = StaticGeocoder::erroring(GeocodeError::network("refused"));
        assert!(geocoder.resolve("anywhere").await.is_err());
    }
}
