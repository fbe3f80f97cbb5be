use thiserror::Error;

use crate::model::Arity;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CloseError {
    #[error("too few values provided for '{name}' (provided={provided}, expected={expected}).")]
    TooFewValues {
        name: String,
        provided: usize,
        expected: usize,
    },

    #[error("too many values provided for '{name}' (provided={provided}, expected={expected}).")]
    TooManyValues {
        name: String,
        provided: usize,
        expected: usize,
    },
}

/// Collects the values of a single occurrence (an option occurrence, or a positional slot) against its arity.
#[derive(Debug)]
pub(crate) struct MatchBuffer {
    name: String,
    arity: Arity,
    values: Vec<String>,
}

impl MatchBuffer {
    pub(crate) fn new(name: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            arity,
            values: Vec::default(),
        }
    }

    pub(crate) fn push(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn is_open(&self) -> bool {
        match self.arity.max {
            Some(n) => self.values.len() < n,
            None => true,
        }
    }

    pub(crate) fn can_close(&self) -> bool {
        self.values.len() >= self.arity.min
    }

    pub(crate) fn close(self) -> Result<Vec<String>, CloseError> {
        if self.values.len() < self.arity.min {
            return Err(CloseError::TooFewValues {
                name: self.name,
                provided: self.values.len(),
                expected: self.arity.min,
            });
        }

        if let Some(max) = self.arity.max {
            if self.values.len() > max {
                return Err(CloseError::TooManyValues {
                    name: self.name,
                    provided: self.values.len(),
                    expected: max,
                });
            }
        }

        Ok(self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::{Distribution, Standard};
    use rand::{thread_rng, Rng};
    use rstest::rstest;

    impl Distribution<Arity> for Standard {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Arity {
            let min: usize = rng.gen_range(0..5);

            if rng.gen() {
                Arity::range(min, min + rng.gen_range(0..5))
            } else {
                Arity::at_least(min)
            }
        }
    }

    #[test]
    fn match_buffer_random() {
        for _ in 0..100 {
            let arity: Arity = thread_rng().gen();
            let mut buffer = MatchBuffer::new("name", arity);

            while buffer.len() < arity.min {
                assert!(buffer.is_open());
                assert!(!buffer.can_close());
                buffer.push("x");
            }

            assert!(buffer.can_close());
            assert_eq!(buffer.is_open(), arity.max.map_or(true, |max| max > arity.min));
            assert_eq!(buffer.close().unwrap().len(), arity.min);
        }
    }

    #[rstest]
    #[case(Arity::at_least(0), 0, true)]
    #[case(Arity::at_least(0), 1, true)]
    #[case(Arity::at_least(1), 0, false)]
    #[case(Arity::at_least(1), 1, true)]
    #[case(Arity::at_least(1), 2, true)]
    #[case(Arity::at_least(10), 2, false)]
    #[case(Arity::range(0, 2), 0, true)]
    #[case(Arity::range(0, 2), 1, true)]
    #[case(Arity::range(1, 2), 0, false)]
    #[case(Arity::range(1, 2), 1, true)]
    #[case(Arity::range(1, 2), 2, true)]
    #[case(Arity::range(10, 20), 2, false)]
    fn match_buffer_lower(#[case] arity: Arity, #[case] feed: usize, #[case] expected_ok: bool) {
        let remains_open = arity.max.map_or(true, |max| max > feed);
        let mut buffer = MatchBuffer::new("name", arity);
        assert!(buffer.is_open());
        let values: Vec<String> = (0..feed).map(|i| i.to_string()).collect();

        for value in &values {
            buffer.push(value.clone());
        }

        assert_eq!(buffer.is_open(), remains_open);

        if expected_ok {
            assert!(buffer.can_close());
            assert_eq!(buffer.close().unwrap(), values);
        } else {
            assert!(!buffer.can_close());
            assert_eq!(
                buffer.close().unwrap_err(),
                CloseError::TooFewValues {
                    name: "name".to_string(),
                    provided: feed,
                    expected: arity.min,
                }
            );
        }
    }

    #[rstest]
    #[case(Arity::range(0, 0), 0, true)]
    #[case(Arity::range(0, 0), 1, false)]
    #[case(Arity::range(0, 1), 0, true)]
    #[case(Arity::range(0, 1), 1, true)]
    #[case(Arity::range(0, 1), 2, false)]
    #[case(Arity::range(0, 10), 20, false)]
    fn match_buffer_upper(#[case] arity: Arity, #[case] feed: usize, #[case] expected_ok: bool) {
        let upper = arity.max.unwrap_or_else(|| unreachable!("un-planned test case"));
        let mut buffer = MatchBuffer::new("name", arity);
        assert_eq!(buffer.is_open(), upper > 0);

        for i in 0..feed {
            buffer.push(i.to_string());
        }

        assert!(buffer.can_close());

        if expected_ok {
            assert_eq!(buffer.is_open(), upper > feed);
            assert_eq!(buffer.close().unwrap().len(), feed);
        } else {
            assert_eq!(
                buffer.close().unwrap_err(),
                CloseError::TooManyValues {
                    name: "name".to_string(),
                    provided: feed,
                    expected: upper,
                }
            );
        }
    }
}
