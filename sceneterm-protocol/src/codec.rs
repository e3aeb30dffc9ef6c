//! Length-prefixed framing for envelopes and replies

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::messages::{Envelope, Reply};

/// Maximum frame size (16 MB)
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Protocol codec error
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Unknown message kind: {0}")]
    UnknownKind(String),

    #[error("Message kind mismatch: payload is {expected}, envelope says {found}")]
    KindMismatch { expected: String, found: String },

    #[error("Protocol version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Codec used by the inspector: encodes [`Envelope`], decodes [`Reply`]
pub struct ClientCodec;

impl ClientCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClientCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ClientCodec {
    type Item = Reply;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        decode_frame(src)
    }
}

impl Encoder<Envelope> for ClientCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Envelope, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(&item, dst)
    }
}

/// Codec used by the host: decodes [`Envelope`], encodes [`Reply`]
pub struct ServerCodec;

impl ServerCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ServerCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ServerCodec {
    type Item = Envelope;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        decode_frame(src)
    }
}

impl Encoder<Reply> for ServerCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Reply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(&item, dst)
    }
}

/// Decode a length-prefixed frame
fn decode_frame<T: serde::de::DeserializeOwned>(
    src: &mut BytesMut,
) -> Result<Option<T>, CodecError> {
    if src.len() < 4 {
        return Ok(None);
    }

    // Peek at length without consuming
    let len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;

    if len > MAX_MESSAGE_SIZE {
        return Err(CodecError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    if src.len() < 4 + len {
        src.reserve(4 + len - src.len());
        return Ok(None);
    }

    src.advance(4);
    let data = src.split_to(len);

    let msg: T = bincode::deserialize(&data)?;
    Ok(Some(msg))
}

/// Encode a length-prefixed frame
fn encode_frame<T: serde::Serialize>(item: &T, dst: &mut BytesMut) -> Result<(), CodecError> {
    let data = bincode::serialize(item)?;

    if data.len() > MAX_MESSAGE_SIZE {
        return Err(CodecError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    dst.reserve(4 + data.len());
    dst.put_u32(data.len() as u32);
    dst.put_slice(&data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Message, NodeSelect, Packet, SceneRefresh};
    use crate::types::SceneNode;

    #[test]
    fn test_envelope_through_both_codecs() {
        let mut client = ClientCodec::new();
        let mut server = ServerCodec::new();

        let env = NodeSelect { node_id: 9 }.encode().unwrap();
        let mut buf = BytesMut::new();
        client.encode(env.clone(), &mut buf).unwrap();

        let decoded = server.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, env);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_reply_carries_tree() {
        let mut client = ClientCodec::new();
        let mut server = ServerCodec::new();

        let tree = SceneNode::new(1, "root").with_children(vec![SceneNode::new(2, "cube")]);
        let refresh = SceneRefresh {
            scene_tree: Some(tree.clone()),
            epoch: 3,
        };
        let mut buf = BytesMut::new();
        server
            .encode(Reply::Accepted(refresh.encode().unwrap()), &mut buf)
            .unwrap();

        match client.decode(&mut buf).unwrap().unwrap() {
            Reply::Accepted(env) => match Packet::decode(&env).unwrap() {
                Packet::SceneRefresh(r) => {
                    assert_eq!(r.scene_tree, Some(tree));
                    assert_eq!(r.epoch, 3);
                }
                other => panic!("unexpected packet {:?}", other),
            },
            Reply::Rejected { reason, .. } => panic!("rejected: {}", reason),
        }
    }

    #[test]
    fn test_partial_frame() {
        let mut client = ClientCodec::new();
        let mut server = ServerCodec::new();

        let mut buf = BytesMut::new();
        client
            .encode(NodeSelect { node_id: 1 }.encode().unwrap(), &mut buf)
            .unwrap();

        let mut partial = buf.split_to(2);
        assert!(server.decode(&mut partial).unwrap().is_none());

        partial.unsplit(buf);
        assert!(server.decode(&mut partial).unwrap().is_some());
    }

    #[test]
    fn test_message_too_large_on_decode() {
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::new();
        buf.put_u32((MAX_MESSAGE_SIZE + 1) as u32);

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(CodecError::MessageTooLarge { .. })));
    }

    #[test]
    fn test_multiple_frames_in_buffer() {
        let mut client = ClientCodec::new();
        let mut server = ServerCodec::new();

        let mut buf = BytesMut::new();
        for id in 1..=3 {
            client
                .encode(NodeSelect { node_id: id }.encode().unwrap(), &mut buf)
                .unwrap();
        }

        for id in 1..=3 {
            let env = server.decode(&mut buf).unwrap().unwrap();
            match Packet::decode(&env).unwrap() {
                Packet::NodeSelect(s) => assert_eq!(s.node_id, id),
                other => panic!("unexpected packet {:?}", other),
            }
        }
        assert!(server.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_rejection_frame() {
        let mut client = ClientCodec::new();
        let mut server = ServerCodec::new();

        let mut buf = BytesMut::new();
        server
            .encode(Reply::rejected("Teleport", "Unknown message kind: Teleport"), &mut buf)
            .unwrap();

        let reply = client.decode(&mut buf).unwrap().unwrap();
        assert_eq!(
            reply,
            Reply::Rejected {
                kind: "Teleport".into(),
                reason: "Unknown message kind: Teleport".into(),
            }
        );
    }
}
