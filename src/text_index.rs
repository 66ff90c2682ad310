/// 字符偏移与字节偏移之间的换算
///
/// 所有对外暴露的位置都以 Unicode 字符计数；切片与拼接前需要换算成字节下标，
/// 否则多字节字符（中文等）会被切断。

use crate::issue_types::Position;

/// 内容的字符长度
pub fn char_len(content: &str) -> usize {
    content.chars().count()
}

/// 字符下标 -> 字节下标（超出范围时夹到内容末尾）
pub fn char_to_byte(content: &str, char_idx: usize) -> usize {
    content
        .char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(content.len())
}

/// 字节下标 -> 字符下标（调用方保证 `byte_idx` 落在字符边界上）
pub fn byte_to_char(content: &str, byte_idx: usize) -> usize {
    content[..byte_idx.min(content.len())].chars().count()
}

/// 将字符区间夹到 `[0, char_len]` 内
pub fn clamp(content: &str, position: Position) -> Position {
    let len = char_len(content);
    Position::new(position.start.min(len), position.end.min(len))
}

/// 字符区间 -> 字节区间
pub fn byte_range(content: &str, position: Position) -> std::ops::Range<usize> {
    let start = char_to_byte(content, position.start);
    let end = char_to_byte(content, position.end.max(position.start));
    start..end
}

/// 取出字符区间对应的文本
pub fn slice(content: &str, position: Position) -> &str {
    &content[byte_range(content, position)]
}
