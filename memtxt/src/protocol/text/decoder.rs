use crate::protocol::text::error::{ProtocolError, Result};
use crate::protocol::text::network::{
    ArithmeticRequest, DeleteRequest, Frame, GetRequest, StorageHeader, StorageVerb,
    TextRequest, TouchRequest, BAD_FORMAT, KEY_TOO_LONG, MAX_KEY_LENGTH, NOREPLY,
};
use bytes::Bytes;
use std::str::{self, FromStr};

type Token<'a> = &'a [u8];

// Only spaces separate tokens, a tab is part of the token
fn tokenize(line: &[u8]) -> Vec<Token<'_>> {
    line.split(|byte| *byte == b' ')
        .filter(|token| !token.is_empty())
        .collect()
}

fn parse_number<T: FromStr>(token: Token) -> Result<T> {
    str::from_utf8(token)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .ok_or(ProtocolError::InvalidCommand(BAD_FORMAT))
}

fn parse_key(token: Token) -> Result<Bytes> {
    if token.len() > MAX_KEY_LENGTH {
        return Err(ProtocolError::InvalidCommand(KEY_TOO_LONG));
    }
    Ok(Bytes::copy_from_slice(token))
}

/// Validates the argument count. One extra token is accepted only
/// when it is the literal `noreply`.
fn check_noreply(args: &[Token], expected: usize) -> Result<bool> {
    if args.len() == expected {
        Ok(false)
    } else if args.len() == expected + 1 && args[expected] == NOREPLY {
        Ok(true)
    } else {
        Err(ProtocolError::InvalidCommand(BAD_FORMAT))
    }
}

fn no_arguments(args: &[Token], request: TextRequest) -> Result<Frame> {
    if !args.is_empty() {
        return Err(ProtocolError::InvalidCommand(BAD_FORMAT));
    }
    Ok(Frame::Request(request))
}

fn parse_get(args: &[Token]) -> Result<GetRequest> {
    if args.is_empty() {
        return Err(ProtocolError::InvalidCommand(BAD_FORMAT));
    }
    let keys = args
        .iter()
        .copied()
        .map(parse_key)
        .collect::<Result<Vec<Bytes>>>()?;
    Ok(GetRequest { keys })
}

fn parse_storage(verb: StorageVerb, args: &[Token]) -> Result<StorageHeader> {
    let noreply = check_noreply(args, 4)?;
    Ok(StorageHeader {
        verb,
        key: parse_key(args[0])?,
        flags: parse_number(args[1])?,
        exptime: parse_number(args[2])?,
        bytes: parse_number(args[3])?,
        cas_unique: 0,
        noreply,
    })
}

// Accepts `<key> <exptime> <bytes> <cas>` and memcached's
// `<key> <flags> <exptime> <bytes> <cas>`, each optionally followed by noreply.
fn parse_cas(args: &[Token]) -> Result<StorageHeader> {
    let with_flags = match args.len() {
        4 => false,
        5 => args[4] != NOREPLY,
        6 => true,
        _ => return Err(ProtocolError::InvalidCommand(BAD_FORMAT)),
    };
    let (flags, rest) = if with_flags {
        (parse_number(args[1])?, &args[2..])
    } else {
        (0, &args[1..])
    };
    let noreply = check_noreply(rest, 3)?;
    Ok(StorageHeader {
        verb: StorageVerb::Cas,
        key: parse_key(args[0])?,
        flags,
        exptime: parse_number(rest[0])?,
        bytes: parse_number(rest[1])?,
        cas_unique: parse_number(rest[2])?,
        noreply,
    })
}

fn parse_delete(args: &[Token]) -> Result<DeleteRequest> {
    let noreply = check_noreply(args, 1)?;
    Ok(DeleteRequest {
        key: parse_key(args[0])?,
        noreply,
    })
}

fn parse_arithmetic(args: &[Token]) -> Result<ArithmeticRequest> {
    let noreply = check_noreply(args, 2)?;
    Ok(ArithmeticRequest {
        key: parse_key(args[0])?,
        delta: parse_number(args[1])?,
        noreply,
    })
}

fn parse_touch(args: &[Token]) -> Result<TouchRequest> {
    let noreply = check_noreply(args, 2)?;
    Ok(TouchRequest {
        key: parse_key(args[0])?,
        exptime: parse_number(args[1])?,
        noreply,
    })
}

/// Decodes a single request line, without its line terminator.
///
/// Storage verbs decode to a [`StorageHeader`]; the caller reads the data
/// block and turns it into a request with [`StorageHeader::into_request`].
pub fn parse_line(line: &[u8]) -> Result<Frame> {
    let tokens = tokenize(line);
    let (verb, args) = match tokens.split_first() {
        Some((verb, args)) => (*verb, args),
        None => return Err(ProtocolError::UnknownCommand),
    };

    match verb {
        b"get" => Ok(Frame::Request(TextRequest::Get(parse_get(args)?))),
        b"gets" => Ok(Frame::Request(TextRequest::Gets(parse_get(args)?))),
        b"set" => Ok(Frame::Storage(parse_storage(StorageVerb::Set, args)?)),
        b"add" => Ok(Frame::Storage(parse_storage(StorageVerb::Add, args)?)),
        b"replace" => Ok(Frame::Storage(parse_storage(StorageVerb::Replace, args)?)),
        b"append" => Ok(Frame::Storage(parse_storage(StorageVerb::Append, args)?)),
        b"prepend" => Ok(Frame::Storage(parse_storage(StorageVerb::Prepend, args)?)),
        b"cas" => Ok(Frame::Storage(parse_cas(args)?)),
        b"delete" => Ok(Frame::Request(TextRequest::Delete(parse_delete(args)?))),
        b"incr" => Ok(Frame::Request(TextRequest::Increment(parse_arithmetic(
            args,
        )?))),
        b"decr" => Ok(Frame::Request(TextRequest::Decrement(parse_arithmetic(
            args,
        )?))),
        b"touch" => Ok(Frame::Request(TextRequest::Touch(parse_touch(args)?))),
        b"flush_all" => no_arguments(args, TextRequest::FlushAll),
        b"quit" => no_arguments(args, TextRequest::Quit),
        b"gat" | b"gats" | b"cache_memlimit" | b"version" | b"stat" | b"stats" => Ok(
            Frame::Request(TextRequest::NotImplemented(Bytes::copy_from_slice(verb))),
        ),
        _ => Err(ProtocolError::UnknownCommand),
    }
}
