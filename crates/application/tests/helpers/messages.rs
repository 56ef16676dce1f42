use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, TXT};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::Ipv4Addr;
use std::str::FromStr;

fn serialize(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

pub fn build_query(name: &str, record_type: RecordType) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);

    serialize(&message)
}

pub fn build_query_with_checking_disabled(name: &str) -> Vec<u8> {
    let mut message = parse(&build_query(name, RecordType::A));
    message.set_checking_disabled(true);
    serialize(&message)
}

/// Upstream answer with a single TXT record of roughly `size` bytes.
pub fn large_txt_answer(query: &[u8], size: usize) -> Vec<u8> {
    let request = Message::from_vec(query).unwrap();

    let mut reply = Message::new(request.id(), MessageType::Response, request.op_code());
    reply.set_recursion_desired(request.recursion_desired());
    reply.set_recursion_available(true);

    let strings = (0..size / 250).map(|_| "x".repeat(250)).collect::<Vec<_>>();
    for q in request.queries() {
        reply.add_query(q.clone());
        reply.add_answer(Record::from_rdata(
            q.name().clone(),
            300,
            RData::TXT(TXT::new(strings.clone())),
        ));
    }

    serialize(&reply)
}

pub fn build_query_without_question(id: u16) -> Vec<u8> {
    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    serialize(&message)
}

/// What a real resolver would send back for `query`.
pub fn upstream_answer(query: &[u8], ip: Ipv4Addr, rcode: ResponseCode) -> Vec<u8> {
    let request = Message::from_vec(query).unwrap();

    let mut reply = Message::new(request.id(), MessageType::Response, request.op_code());
    reply.set_recursion_desired(request.recursion_desired());
    reply.set_recursion_available(true);
    reply.set_response_code(rcode);

    for q in request.queries() {
        reply.add_query(q.clone());
        if rcode == ResponseCode::NoError {
            reply.add_answer(Record::from_rdata(q.name().clone(), 300, RData::A(A(ip))));
        }
    }

    serialize(&reply)
}

pub fn parse(bytes: &[u8]) -> Message {
    Message::from_vec(bytes).unwrap()
}
