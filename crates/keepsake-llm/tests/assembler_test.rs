use keepsake_llm::{ChatMessage, DeltaAssembler, Transcript, Update};

const HELLO_WORLD_STREAM: &[u8] = b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"Hello\"}}\n\
data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\" world\"}}\n\
data: [DONE]\n";

fn feed_whole(data: &[u8]) -> (Vec<Update>, DeltaAssembler) {
    let mut assembler = DeltaAssembler::new();
    let updates = assembler.push_chunk(data);
    (updates, assembler)
}

fn feed_chunked(data: &[u8], chunk_size: usize) -> (Vec<Update>, DeltaAssembler) {
    let mut assembler = DeltaAssembler::new();
    let mut updates = Vec::new();
    for chunk in data.chunks(chunk_size) {
        updates.extend(assembler.push_chunk(chunk));
    }
    (updates, assembler)
}

#[test]
fn hello_world_scenario() {
    let (updates, assembler) = feed_whole(HELLO_WORLD_STREAM);

    let messages: Vec<&str> = updates.iter().map(|u| u.message.as_str()).collect();
    assert_eq!(messages, vec!["Hello", "Hello world"]);

    let fragments: Vec<&str> = updates.iter().map(|u| u.fragment.as_str()).collect();
    assert_eq!(fragments, vec!["Hello", " world"]);

    assert!(assembler.is_finished());
    assert_eq!(assembler.into_message(), "Hello world");
}

#[test]
fn output_is_independent_of_fragmentation() {
    let (_, whole) = feed_whole(HELLO_WORLD_STREAM);
    let expected = whole.into_message();

    for chunk_size in 1..=HELLO_WORLD_STREAM.len() {
        let (updates, assembler) = feed_chunked(HELLO_WORLD_STREAM, chunk_size);
        assert_eq!(
            assembler.message(),
            expected,
            "chunk size {} changed the output",
            chunk_size
        );
        assert_eq!(updates.len(), 2, "chunk size {} changed update count", chunk_size);
        assert_eq!(updates.last().unwrap().message, expected);
    }
}

#[test]
fn output_is_independent_of_split_point() {
    let (_, whole) = feed_whole(HELLO_WORLD_STREAM);
    let expected = whole.into_message();

    // Split the byte stream into two chunks at every possible offset.
    for split in 0..=HELLO_WORLD_STREAM.len() {
        let mut assembler = DeltaAssembler::new();
        let mut updates = assembler.push_chunk(&HELLO_WORLD_STREAM[..split]);
        updates.extend(assembler.push_chunk(&HELLO_WORLD_STREAM[split..]));

        assert_eq!(assembler.message(), expected, "split at {} lost data", split);
        assert_eq!(updates.len(), 2, "split at {} duplicated or dropped a delta", split);
    }
}

#[test]
fn json_payload_split_across_chunks() {
    let mut assembler = DeltaAssembler::new();

    let first = b"data: {\"type\":\"content_b";
    let second = b"lock_delta\",\"delta\":{\"text\":\"Hello\"}}\n";

    assert!(assembler.push_chunk(first).is_empty());

    let updates = assembler.push_chunk(second);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].message, "Hello");
}

#[test]
fn multibyte_character_split_across_chunks() {
    let stream = "data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"café ☕\"}}\n"
        .as_bytes();

    for chunk_size in 1..=4 {
        let (updates, assembler) = feed_chunked(stream, chunk_size);
        assert_eq!(updates.len(), 1);
        assert_eq!(assembler.message(), "café ☕");
    }
}

#[test]
fn done_sentinel_stops_processing_buffered_residue() {
    let stream = b"data: [DONE]\n\
data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"late\"}}\n";

    let (updates, mut assembler) = feed_whole(stream);
    assert!(updates.is_empty());
    assert!(assembler.is_finished());

    // Chunks arriving after termination are ignored outright.
    let more = assembler
        .push_chunk(b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"later\"}}\n");
    assert!(more.is_empty());
    assert_eq!(assembler.message(), "");
}

#[test]
fn message_stop_terminates_like_done() {
    let stream = b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"Hi\"}}\n\
data: {\"type\":\"message_stop\"}\n\
data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"late\"}}\n";

    let (updates, assembler) = feed_whole(stream);
    assert_eq!(updates.len(), 1);
    assert!(assembler.is_finished());
    assert_eq!(assembler.into_message(), "Hi");
}

#[test]
fn comments_and_blank_lines_are_inert() {
    let stream = b": keep-alive\n\
\n\
   \n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"ok\"}}\n";

    let (updates, assembler) = feed_whole(stream);
    assert_eq!(updates.len(), 1);
    assert_eq!(assembler.message(), "ok");
}

#[test]
fn unknown_event_types_are_ignored() {
    let stream = b"data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\
data: {\"type\":\"ping\"}\n\
data: {\"type\":\"content_block_start\",\"index\":0}\n\
data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"text\"}}\n\
data: {\"type\":\"content_block_stop\",\"index\":0}\n";

    let (updates, assembler) = feed_whole(stream);
    assert_eq!(updates.len(), 1);
    assert_eq!(assembler.message(), "text");
}

#[test]
fn empty_delta_text_does_not_update() {
    let stream = b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"\"}}\n\
data: {\"type\":\"content_block_delta\",\"delta\":{}}\n";

    let (updates, assembler) = feed_whole(stream);
    assert!(updates.is_empty());
    assert_eq!(assembler.message(), "");
}

#[test]
fn crlf_lines_are_handled() {
    let stream = b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"Hi\"}}\r\n\
data: [DONE]\r\n";

    let (updates, assembler) = feed_whole(stream);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].message, "Hi");
    assert!(assembler.is_finished());
}

#[test]
fn incomplete_data_line_waits_for_more_bytes() {
    let mut assembler = DeltaAssembler::new();

    // The line feed arrived but the JSON payload did not finish; the line is
    // re-buffered rather than treated as fatal.
    assert!(assembler.push_chunk(b"data: {\"type\":\"conte\n").is_empty());
    assert!(!assembler.is_finished());

    // A later well-formed event still goes through; the stalled line is
    // dropped once it provably cannot complete.
    let updates = assembler
        .push_chunk(b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"ok\"}}\n");
    assert_eq!(updates.len(), 1);
    assert_eq!(assembler.message(), "ok");
}

#[test]
fn genuinely_invalid_line_is_skipped_without_error() {
    let mut assembler = DeltaAssembler::new();

    assembler.push_chunk(b"data: not json at all\n");
    let updates = assembler
        .push_chunk(b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"still going\"}}\n");

    assert_eq!(updates.len(), 1);
    assert_eq!(assembler.message(), "still going");
}

#[test]
fn stream_end_without_terminator_is_normal_completion() {
    let stream = b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"partial reply\"}}\n";

    let (updates, assembler) = feed_whole(stream);
    assert_eq!(updates.len(), 1);
    assert!(!assembler.is_finished());

    // End of transport: the session ends with whatever was assembled.
    assert_eq!(assembler.into_message(), "partial reply");
}

#[test]
fn stream_end_mid_line_keeps_assembled_text() {
    let mut assembler = DeltaAssembler::new();

    assembler.push_chunk(b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"done part\"}}\n");
    assembler.push_chunk(b"data: {\"type\":\"content_b");

    assert_eq!(assembler.into_message(), "done part");
}

#[test]
fn transcript_replaces_only_last_entry() {
    let mut transcript: Vec<ChatMessage> = vec![
        ChatMessage::user("What patterns do you notice?"),
        ChatMessage::assistant(""),
    ];

    let mut assembler = DeltaAssembler::new();
    for update in assembler.push_chunk(HELLO_WORLD_STREAM) {
        transcript.replace_last(&update.message);
    }

    assert_eq!(transcript[0].content, "What patterns do you notice?");
    assert_eq!(transcript[1].content, "Hello world");
}
