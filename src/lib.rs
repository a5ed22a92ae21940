pub mod shared {
    pub mod core {
        pub mod event;
        pub mod retry_policy;
    }
    pub mod infrastructure {
        pub mod event_bus;
        pub mod external_commands;
        pub mod external_events;
    }
}

pub mod testing {
    pub mod config;
    pub mod events_log;
    pub mod eventually;
    pub mod host;
    pub mod logging;
}
