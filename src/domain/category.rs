//! Binary category selector. Passed to the classifier untransformed.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// Raw encoding used in the feature vector.
    #[must_use]
    pub fn raw(self) -> u8 {
        match self {
            Self::Male => 0,
            Self::Female => 1,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_male_zero() {
        assert_eq!(Gender::default(), Gender::Male);
        assert_eq!(Gender::default().raw(), 0);
    }

    #[test]
    fn test_raw_encoding() {
        assert_eq!(Gender::Female.raw(), 1);
        assert_eq!(Gender::Male.toggled(), Gender::Female);
        assert_eq!(Gender::Female.toggled(), Gender::Male);
    }
}
