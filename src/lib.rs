// Crate entry point. Re-export modules so tests and binaries can import them easily.
//
// Responsibilities
// - Only declare and expose modules. No business logic here.

pub mod core {
    pub mod event;
    pub mod outbox_record;
    pub mod ports;
    pub mod topics;
}

pub mod application {
    pub mod dispatcher;
    pub mod errors;
    pub mod outbox_service;
    pub mod publisher;
    pub mod serializer;
}

pub mod adapters {
    pub mod in_memory {
        pub mod in_memory_broker;
        pub mod in_memory_outbox_store;
    }
    pub mod pulsar {
        pub mod pulsar_broker_publisher;
    }
}

pub mod shell {
    pub mod config;
}
