// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// SM-2 quality scores below this are lapses.
pub const PASS_QUALITY: u8 = 3;

/// How well the user recalled an item.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// The rating on the classic 0-5 SM-2 quality scale.
    pub fn quality(self) -> u8 {
        match self {
            Rating::Again => 2,
            Rating::Hard => 3,
            Rating::Good => 4,
            Rating::Easy => 5,
        }
    }

    pub fn is_failure(self) -> bool {
        self.quality() < PASS_QUALITY
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    /// Parse the 1-4 button number used by keyboard-driven front ends.
    pub fn from_number(n: u8) -> Fallible<Rating> {
        match n {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            _ => Err(ErrorReport::invalid_input(format!(
                "invalid rating number: {n}"
            ))),
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for Rating {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            _ => Err(ErrorReport::invalid_input(format!(
                "invalid rating: '{value}'"
            ))),
        }
    }
}

impl From<Rating> for String {
    fn from(rating: Rating) -> String {
        rating.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_quality_mapping() {
        let expected = [2, 3, 4, 5];
        for (rating, q) in zip(Rating::ALL, expected) {
            assert_eq!(rating.quality(), q);
        }
    }

    #[test]
    fn test_only_again_fails() {
        assert!(Rating::Again.is_failure());
        assert!(!Rating::Hard.is_failure());
        assert!(!Rating::Good.is_failure());
        assert!(!Rating::Easy.is_failure());
    }

    #[test]
    fn test_string_roundtrip() -> Fallible<()> {
        for rating in Rating::ALL {
            assert_eq!(rating, Rating::try_from(rating.as_str().to_string())?);
        }
        Ok(())
    }

    #[test]
    fn test_serialization_format() -> Fallible<()> {
        assert_eq!(serde_json::to_string(&Rating::Hard)?, "\"hard\"");
        Ok(())
    }

    /// Unknown ratings are rejected, never coerced.
    #[test]
    fn test_invalid_rating_string() {
        for s in ["", "Good", "forgot", "5"] {
            let err = Rating::try_from(s.to_string()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        assert!(serde_json::from_str::<Rating>("\"meh\"").is_err());
    }

    #[test]
    fn test_from_number() -> Fallible<()> {
        assert_eq!(Rating::from_number(1)?, Rating::Again);
        assert_eq!(Rating::from_number(4)?, Rating::Easy);
        assert!(Rating::from_number(0).is_err());
        assert!(Rating::from_number(5).is_err());
        Ok(())
    }
}
