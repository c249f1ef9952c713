pub use snapcode_core::*;

#[cfg(feature = "server")]
pub mod server {
    pub use snapcode_server::*;
}

#[cfg(feature = "fs")]
pub mod fs {
    pub use snapcode_fs::*;
}

#[cfg(feature = "imaging")]
pub mod imaging {
    pub use snapcode_imaging::*;
}

#[cfg(feature = "notify")]
pub mod notify {
    pub use snapcode_notify::*;
}

pub mod prelude {
    pub use snapcode_core::prelude::*;

    #[cfg(feature = "server")]
    pub use snapcode_server::prelude::*;

    #[cfg(feature = "fs")]
    pub use snapcode_fs::FileSystemStore;

    #[cfg(feature = "imaging")]
    pub use snapcode_imaging::BrandingLayer;

    #[cfg(feature = "notify")]
    pub use snapcode_notify::{ConfiguredNotifier, LogNotifier, RecordingNotifier};

    #[cfg(feature = "smtp")]
    pub use snapcode_notify::{SmtpConfig, SmtpNotifier};
}
