mod dns;
mod redirect;

pub use dns::DnsServices;
pub use redirect::RedirectServices;
