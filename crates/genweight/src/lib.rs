//! CLI-side glue for the genweight scanner: filelist loading and the
//! local JSON column reader. The scan engine itself lives in
//! `genweight_engine`.

pub mod filelist;
pub mod reader;
