//! End-to-end scenarios driven against a fake in-process router: a raw
//! `TcpListener` that speaks just enough of the wire protocol to exercise
//! one code path each.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use i2cp::client::{msg, Client};
use i2cp::destination::Destination;
use i2cp::session::{LookupResult, SessionCallbacks, SessionStatus};
use i2cp::session_config::SessionConfig;
use i2cp::stream::Stream;
use i2cp::transport::{TcpTransport, Transport, PROP_PORT};

fn fake_router() -> (TcpListener, u16) {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();
	(listener, port)
}

fn connect_client(port: u16) -> Arc<Client<TcpTransport>> {
	let mut transport = TcpTransport::new();
	transport.set_property(PROP_PORT, &port.to_string()).unwrap();
	Client::new(transport)
}

fn read_frame(sock: &mut TcpStream) -> (u8, Vec<u8>) {
	let mut header = [0u8; 5];
	sock.read_exact(&mut header).unwrap();
	let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
	let typ = header[4];
	let mut body = vec![0u8; len - 1];
	sock.read_exact(&mut body).unwrap();
	(typ, body)
}

fn write_frame(sock: &mut TcpStream, typ: u8, body: &Stream) {
	let mut frame = Stream::new();
	frame.write_u32((body.len() + 1) as u32);
	frame.write_u8(typ);
	frame.write_bytes(body.bytes());
	sock.write_all(frame.bytes()).unwrap();
}

fn do_handshake(sock: &mut TcpStream, version: &str, date: u64) {
	let mut magic = [0u8; 1];
	sock.read_exact(&mut magic).unwrap();
	assert_eq!(magic[0], i2cp::client::PROTOCOL_INIT);
	let (typ, _) = read_frame(sock);
	assert_eq!(typ, msg::GET_DATE);
	let mut reply = Stream::new();
	reply.write_u64(date);
	reply.write_bytes(version.as_bytes());
	write_frame(sock, msg::SET_DATE, &reply);
}

#[derive(Default)]
struct RecordingCallbacks {
	status: Mutex<Vec<SessionStatus>>,
	messages: Mutex<Vec<(u8, u16, u16, Vec<u8>)>>,
	destinations: Mutex<Vec<(u32, String, bool)>>,
	disconnects: Mutex<Vec<String>>,
}

impl SessionCallbacks for RecordingCallbacks {
	fn on_status(&self, status: SessionStatus) {
		self.status.lock().unwrap().push(status);
	}

	fn on_destination(&self, request_id: u32, address: &str, dest: LookupResult) {
		self.destinations
			.lock()
			.unwrap()
			.push((request_id, address.to_string(), dest.is_some()));
	}

	fn on_message(&self, protocol: u8, src_port: u16, dst_port: u16, payload: &[u8]) {
		self.messages
			.lock()
			.unwrap()
			.push((protocol, src_port, dst_port, payload.to_vec()));
	}

	fn on_disconnect(&self, reason: &str) {
		self.disconnects.lock().unwrap().push(reason.to_string());
	}
}

/// S2: CreateSession happy path.
#[test]
fn create_session_registers_the_router_assigned_id() {
	let (listener, port) = fake_router();
	let server = thread::spawn(move || {
		let (mut sock, _) = listener.accept().unwrap();
		do_handshake(&mut sock, "0.9.12", 1_700_000_000);
		let (typ, _) = read_frame(&mut sock);
		assert_eq!(typ, msg::CREATE_SESSION);
		let mut reply = Stream::new();
		reply.write_u16(7);
		reply.write_u8(1); // Created
		write_frame(&mut sock, msg::SESSION_STATUS, &reply);
	});

	let client = connect_client(port);
	client.connect().unwrap();
	let callbacks = Arc::new(RecordingCallbacks::default());
	let config = SessionConfig::new(Destination::new());
	let id = client.create_session(config, callbacks.clone()).unwrap();
	assert_eq!(id, 7);
	assert_eq!(*callbacks.status.lock().unwrap(), vec![SessionStatus::Created]);
	server.join().unwrap();
}

/// S3: PayloadMessage delivery with the gzip overlay header.
#[test]
fn payload_message_is_decompressed_and_dispatched() {
	let (listener, port) = fake_router();
	let server = thread::spawn(move || {
		let (mut sock, _) = listener.accept().unwrap();
		do_handshake(&mut sock, "0.9.12", 1_700_000_000);
		let (typ, _) = read_frame(&mut sock);
		assert_eq!(typ, msg::CREATE_SESSION);
		let mut status = Stream::new();
		status.write_u16(7);
		status.write_u8(1);
		write_frame(&mut sock, msg::SESSION_STATUS, &status);

		let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
		encoder.write_all(b"hello").unwrap();
		let mut gz = encoder.finish().unwrap();
		gz[4..6].copy_from_slice(&111u16.to_le_bytes());
		gz[6..8].copy_from_slice(&222u16.to_le_bytes());
		gz[9] = 17;

		let mut payload = Stream::new();
		payload.write_u16(7);
		payload.write_u32(1);
		payload.write_u32(gz.len() as u32);
		payload.write_bytes(&gz);
		write_frame(&mut sock, msg::PAYLOAD_MESSAGE, &payload);
	});

	let client = connect_client(port);
	client.connect().unwrap();
	let callbacks = Arc::new(RecordingCallbacks::default());
	let config = SessionConfig::new(Destination::new());
	client.create_session(config, callbacks.clone()).unwrap();
	client.process_io().unwrap();

	let messages = callbacks.messages.lock().unwrap();
	assert_eq!(messages.len(), 1);
	assert_eq!(messages[0], (17, 111, 222, b"hello".to_vec()));
	server.join().unwrap();
}

/// S4: HostLookup success on a router that advertises CAN_HOST_LOOKUP.
#[test]
fn host_lookup_success_dispatches_the_resolved_destination() {
	let (listener, port) = fake_router();
	let seen_request_id = Arc::new(AtomicU32::new(0));
	let seen_request_id2 = seen_request_id.clone();
	let server = thread::spawn(move || {
		let (mut sock, _) = listener.accept().unwrap();
		do_handshake(&mut sock, "0.9.12", 1_700_000_000);
		let (typ, _) = read_frame(&mut sock);
		assert_eq!(typ, msg::CREATE_SESSION);
		let mut status = Stream::new();
		status.write_u16(7);
		status.write_u8(1);
		write_frame(&mut sock, msg::SESSION_STATUS, &status);

		let (typ, body) = read_frame(&mut sock);
		assert_eq!(typ, msg::HOST_LOOKUP);
		let mut req = Stream::from_vec(body);
		let _session_id = req.read_u16().unwrap();
		let request_id = req.read_u32().unwrap();
		seen_request_id2.store(request_id, Ordering::SeqCst);
		let _timeout = req.read_u32().unwrap();
		let lookup_type = req.read_u8().unwrap();
		assert_eq!(lookup_type, 1); // host
		let data = req.read_to_end();
		assert_eq!(data, b"example.i2p");

		let dest = Destination::new();
		let mut dest_msg = Stream::new();
		dest.write_to_message(&mut dest_msg);

		let mut reply = Stream::new();
		reply.write_u16(7);
		reply.write_u32(request_id);
		reply.write_u8(0);
		reply.write_bytes(dest_msg.bytes());
		write_frame(&mut sock, msg::HOST_REPLY, &reply);
	});

	let client = connect_client(port);
	client.connect().unwrap();
	let callbacks = Arc::new(RecordingCallbacks::default());
	let config = SessionConfig::new(Destination::new());
	let session_id = client.create_session(config, callbacks.clone()).unwrap();
	let request_id = client.destination_lookup(session_id, "example.i2p").unwrap();
	client.process_io().unwrap();
	// process_io's second receive (HostReply) happens on the next poll.
	client.process_io().unwrap();

	assert_eq!(request_id, seen_request_id.load(Ordering::SeqCst));
	let destinations = callbacks.destinations.lock().unwrap();
	assert_eq!(destinations.len(), 1);
	assert_eq!(destinations[0].0, request_id);
	assert_eq!(destinations[0].1, "example.i2p");
	assert!(destinations[0].2);
	server.join().unwrap();
}

/// S5: legacy DestLookup failure against a pre-0.9.10 router.
#[test]
fn legacy_dest_lookup_failure_resolves_to_a_null_destination() {
	let (listener, port) = fake_router();
	let server = thread::spawn(move || {
		let (mut sock, _) = listener.accept().unwrap();
		do_handshake(&mut sock, "0.9.9", 1_700_000_000);
		let (typ, _) = read_frame(&mut sock);
		assert_eq!(typ, msg::CREATE_SESSION);
		let mut status = Stream::new();
		status.write_u16(7);
		status.write_u8(1);
		write_frame(&mut sock, msg::SESSION_STATUS, &status);

		let (typ, body) = read_frame(&mut sock);
		assert_eq!(typ, msg::DEST_LOOKUP);
		assert_eq!(body.len(), 32);

		let mut reply = Stream::new();
		reply.write_bytes(&body);
		write_frame(&mut sock, msg::DEST_REPLY, &reply);
	});

	let client = connect_client(port);
	client.connect().unwrap();
	let callbacks = Arc::new(RecordingCallbacks::default());
	let config = SessionConfig::new(Destination::new());
	let session_id = client.create_session(config, callbacks.clone()).unwrap();

	let address = {
		let zero_digest = Stream::from_vec(vec![0u8; 32]);
		let encoded = i2cp::crypto::encode_stream(i2cp::crypto::Codec::Base32, &zero_digest);
		format!("{}.b32.i2p", String::from_utf8(encoded.into_vec()).unwrap())
	};
	let request_id = client.destination_lookup(session_id, &address).unwrap();
	client.process_io().unwrap();
	client.process_io().unwrap();

	let destinations = callbacks.destinations.lock().unwrap();
	assert_eq!(destinations.len(), 1);
	assert_eq!(destinations[0].0, request_id);
	assert_eq!(destinations[0].1, address);
	assert!(!destinations[0].2);
	server.join().unwrap();
}

/// S6: Disconnect tears down sessions and fires the callback.
#[test]
fn disconnect_notifies_all_registered_sessions() {
	let (listener, port) = fake_router();
	let server = thread::spawn(move || {
		let (mut sock, _) = listener.accept().unwrap();
		do_handshake(&mut sock, "0.9.12", 1_700_000_000);
		let (typ, _) = read_frame(&mut sock);
		assert_eq!(typ, msg::CREATE_SESSION);
		let mut status = Stream::new();
		status.write_u16(7);
		status.write_u8(1);
		write_frame(&mut sock, msg::SESSION_STATUS, &status);

		let mut reason = Stream::new();
		reason.write_u8(b"shutdown".len() as u8);
		reason.write_bytes(b"shutdown");
		write_frame(&mut sock, msg::DISCONNECT, &reason);
	});

	let client = connect_client(port);
	client.connect().unwrap();
	let callbacks = Arc::new(RecordingCallbacks::default());
	let config = SessionConfig::new(Destination::new());
	client.create_session(config, callbacks.clone()).unwrap();
	client.process_io().unwrap();

	assert_eq!(*callbacks.disconnects.lock().unwrap(), vec!["shutdown".to_string()]);
	assert!(!client.is_connected());
	server.join().unwrap();
}

/// Invariant 9: lookup ids are strictly increasing across calls. Legacy
/// `DestLookup` only queues a frame, so this needs no live router.
#[test]
fn lookup_ids_are_monotonically_increasing() {
	let client = connect_client(0);
	let zero_digest = Stream::from_vec(vec![0u8; 32]);
	let encoded = i2cp::crypto::encode_stream(i2cp::crypto::Codec::Base32, &zero_digest);
	let address = format!("{}.b32.i2p", String::from_utf8(encoded.into_vec()).unwrap());

	let first = client.destination_lookup(1, &address).unwrap();
	let second = client.destination_lookup(1, &address).unwrap();
	let third = client.destination_lookup(1, &address).unwrap();
	assert!(second > first);
	assert!(third > second);
}

/// Invariant 10: the output queue preserves FIFO order across two sends.
#[test]
fn output_queue_is_fifo() {
	let (listener, port) = fake_router();
	let received_order = Arc::new(AtomicBool::new(false));
	let first_seen = Arc::new(AtomicU16::new(0));
	let order_clone = received_order.clone();
	let first_clone = first_seen.clone();
	let server = thread::spawn(move || {
		let (mut sock, _) = listener.accept().unwrap();
		do_handshake(&mut sock, "0.9.12", 1_700_000_000);
		let (typ, _) = read_frame(&mut sock);
		assert_eq!(typ, msg::CREATE_SESSION);
		let mut status = Stream::new();
		status.write_u16(1);
		status.write_u8(1);
		write_frame(&mut sock, msg::SESSION_STATUS, &status);

		let (typ_a, body_a) = read_frame(&mut sock);
		assert_eq!(typ_a, msg::SEND_MESSAGE);
		let session_id = u16::from_be_bytes([body_a[0], body_a[1]]);
		first_clone.store(session_id, Ordering::SeqCst);
		let (typ_b, _) = read_frame(&mut sock);
		assert_eq!(typ_b, msg::SEND_MESSAGE);
		order_clone.store(true, Ordering::SeqCst);
	});

	let client = connect_client(port);
	client.connect().unwrap();
	let callbacks = Arc::new(RecordingCallbacks::default());
	let config = SessionConfig::new(Destination::new());
	let id = client.create_session(config, callbacks.clone()).unwrap();
	client.send_message(id, 6, 1, 2, b"a", 1).unwrap();
	client.send_message(id, 6, 1, 2, b"b", 2).unwrap();
	client.process_io().unwrap();
	thread::sleep(Duration::from_millis(50));

	assert!(received_order.load(Ordering::SeqCst));
	assert_eq!(first_seen.load(Ordering::SeqCst), id);
	server.join().unwrap();
}
