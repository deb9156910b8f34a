mod common;
mod period;
