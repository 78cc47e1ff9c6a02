pub mod climo_row;
pub mod monthly_aggregate;
pub mod observation;
pub mod period;
pub mod record_pair;
pub mod variable;
