mod page;

pub use page::profile;
