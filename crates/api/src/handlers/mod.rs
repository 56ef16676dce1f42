pub mod redirect;

pub use redirect::redirect;
