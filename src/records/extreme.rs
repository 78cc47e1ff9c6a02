use crate::types::record_pair::Extreme;
use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Picks the most extreme `(value, date)` candidate. Ties go to the earliest date, so
/// the result does not depend on the order candidates arrive in.
pub(crate) fn pick_extreme<I>(candidates: I, extreme: Extreme) -> Option<(f64, NaiveDate)>
where
    I: IntoIterator<Item = (f64, NaiveDate)>,
{
    let finite = candidates.into_iter().filter(|(v, _)| v.is_finite());
    match extreme {
        Extreme::Highest => finite.min_by_key(|(v, d)| (Reverse(OrderedFloat(*v)), *d)),
        Extreme::Lowest => finite.min_by_key(|(v, d)| (OrderedFloat(*v), *d)),
    }
}
