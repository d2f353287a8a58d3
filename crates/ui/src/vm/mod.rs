mod page_vm;

pub use page_vm::{NavLinkVm, PageVm, map_page};
