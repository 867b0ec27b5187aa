//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to               |
//! |------------|---------------|---------------------------|
//! | `hardware` | ActuatorPort  | ESP32 GPIO (H-bridge, valves) |
//! | `http`     |               | ESP-IDF httpd → AppService |
//! | `log_sink` | EventSink     | Serial log output         |
//! | `time`     | ClockPort     | newlib wall clock, SNTP, system timer |
//! | `wifi`     |               | ESP-IDF WiFi STA          |

pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod time;
pub mod wifi;
