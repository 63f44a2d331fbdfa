pub const MIN_STARS: i64 = 1;
pub const MAX_STARS: i64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StarRating(u8);

impl StarRating {
    pub fn new(stars: i64) -> Option<Self> {
        if (MIN_STARS..=MAX_STARS).contains(&stars) {
            Some(Self(stars as u8))
        } else {
            None
        }
    }

    pub fn stars(&self) -> i64 {
        self.0 as i64
    }
}

/// Arithmetic mean of `ratings`, rounded half away from zero to one decimal
/// place. An empty set averages to `0`.
///
/// The mean is computed in tenths with integer arithmetic so that values such
/// as `4.25` round the same way on every platform.
pub fn average_rating(ratings: &[i64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let count = ratings.len() as i64;
    let scaled: i64 = ratings.iter().sum::<i64>() * 10;

    let mut tenths = scaled / count;
    let remainder = scaled % count;
    if 2 * remainder.abs() >= count {
        tenths += scaled.signum();
    }
    tenths as f64 / 10.0
}
