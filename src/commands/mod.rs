pub mod gui;
pub mod load;
pub mod run;
pub mod trace;
