pub mod move_date;
