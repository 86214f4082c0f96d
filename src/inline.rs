use crate::block::InlineToken;
use crate::model::Run;
use crate::style::StyleName;

/// Formatting flags inherited from enclosing tokens. Flags only ever turn on.
#[derive(Debug, Clone, Copy, Default)]
struct Marks {
    bold: bool,
    italic: bool,
    strikethrough: bool,
}

impl Marks {
    fn apply(self, mut run: Run) -> Run {
        run.bold |= self.bold;
        run.italic |= self.italic;
        run.strikethrough |= self.strikethrough;
        run
    }
}

/// Flatten inline tokens into styled runs, depth-first and left to right.
pub fn resolve_inline(tokens: &[InlineToken]) -> Vec<Run> {
    let mut runs = Vec::new();
    resolve_into(tokens, Marks::default(), &mut runs);
    runs
}

fn resolve_into(tokens: &[InlineToken], marks: Marks, runs: &mut Vec<Run>) {
    for token in tokens {
        match token {
            InlineToken::PlainText { text } => runs.push(marks.apply(Run::plain(text.as_str()))),
            InlineToken::Strong { children } => resolve_into(
                children,
                Marks {
                    bold: true,
                    ..marks
                },
                runs,
            ),
            InlineToken::Emphasis { children } => resolve_into(
                children,
                Marks {
                    italic: true,
                    ..marks
                },
                runs,
            ),
            InlineToken::Strikethrough { children } => resolve_into(
                children,
                Marks {
                    strikethrough: true,
                    ..marks
                },
                runs,
            ),
            InlineToken::CodeSpan { text } => {
                runs.push(marks.apply(Run::styled(text.as_str(), StyleName::InlineCode)))
            }
            InlineToken::Link { display_text, href } => {
                let mut run = Run::styled(display_text.as_str(), StyleName::Link);
                run.link = Some(href.clone());
                runs.push(marks.apply(run));
            }
            InlineToken::LineBreak => runs.push(marks.apply(Run::plain("\n"))),
            InlineToken::Unrecognized { text, children } => match (text, children) {
                (Some(text), _) if !text.is_empty() => {
                    runs.push(marks.apply(Run::plain(text.as_str())))
                }
                (_, Some(children)) => resolve_into(children, marks, runs),
                _ => {}
            },
        }
    }
}
