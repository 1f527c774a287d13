/// 텍스트의 토큰 수를 추정
///
/// 영어는 평균 4글자가 1토큰, 한글/한자 등 비ASCII 문자는 1글자가 1토큰으로 계산합니다.
/// provider의 실제 tokenizer가 아니라 예산 사전 검사용 근사치입니다.
///
/// # Examples
/// ```
/// use bcopilot::ai::tokens::estimate;
///
/// assert_eq!(estimate(""), 0);
/// assert_eq!(estimate("abcdefgh"), 2);
/// assert_eq!(estimate("파일 목록"), 4);
/// ```
pub fn estimate(text: &str) -> usize {
    let (ascii, non_ascii) = text.chars().fold((0usize, 0usize), |(a, n), c| {
        if c.is_ascii() {
            (a + 1, n)
        } else {
            (a, n + 1)
        }
    });

    ascii / 4 + non_ascii
}
