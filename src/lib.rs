pub mod core {
    pub mod domain;
    pub mod library;
    pub mod repository;
}

pub mod books;

pub mod catalog {
    pub mod domain;
    pub mod factory;
}

pub mod reading;
pub mod users;

pub mod utils {
    pub mod ddb;
    pub mod logs;
}
