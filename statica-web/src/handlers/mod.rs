pub mod sites;

pub use sites::{
    create_site_handler, delete_site_handler, get_site_handler, list_sites_handler,
    update_site_handler,
};
