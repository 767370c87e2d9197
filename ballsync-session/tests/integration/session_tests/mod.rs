mod test_consumer_echoes_coordinates;
mod test_interrupt_during_handshake;
mod test_loopback_session;
mod test_unreachable_signaling;
