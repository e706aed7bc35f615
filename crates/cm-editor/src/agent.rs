//! Bridge request execution.
//!
//! Runs on the editor thread only; the worker never touches buffers.
//! Requests resolve their buffer by exact path, then by final path
//! component, and execute as ordinary buffer operations. Any view
//! showing a mutated buffer repaints before the response goes back.

use crate::{ScreenEditor, display_name};
use cm_bridge::{BridgeRequest, BridgeResponse};
use cm_buffer::EditHint;
use cm_view::Writer;
use regex::RegexBuilder;
use serde_json::{Value, json};
use std::path::Path;
use tracing::debug;

/// Whole-buffer reads above this size must use get_buffer_range.
const MAX_GET_BUFFER_BYTES: usize = 10_000;

impl ScreenEditor {
    pub fn execute_bridge_request(
        &mut self,
        request: &BridgeRequest,
        out: &mut Writer,
    ) -> BridgeResponse {
        debug!(target: "agent", id = request.id, cmd = %request.cmd, "execute");
        let id = request.id;
        let result = match request.cmd.as_str() {
            "list_buffers" => self.agent_list_buffers(),
            "get_buffer" => self.agent_get_buffer(request),
            "get_buffer_range" => self.agent_get_buffer_range(request),
            "replace_range" => self.agent_replace_range(request, out),
            "insert_lines" => self.agent_insert_lines(request, out),
            "delete_lines" => self.agent_delete_lines(request, out),
            "find_in_buffer" => self.agent_find_in_buffer(request),
            "find_and_replace" => self.agent_find_and_replace(request, out),
            "open_file" => self.agent_open_file(request, out),
            "save_buffer" => self.agent_save_buffer(request, out),
            "get_cursor" => self.agent_get_cursor(),
            "goto_line" => self.agent_goto_line(request, out),
            other => Err(format!("unknown command: {other}")),
        };
        match result {
            Ok(data) => BridgeResponse::success(id, data),
            Err(error) => BridgeResponse::failure(id, error),
        }
    }

    /// Resolve and demand-load a buffer id. Errors are wire strings.
    fn resolve_buffer(&mut self, buffer_id: &str) -> Result<usize, String> {
        let Some(index) = self.buffers.resolve(buffer_id) else {
            return Err(format!("buffer not found: {buffer_id}"));
        };
        if let Some(buf) = self.buffers.at_mut(index)
            && let Err(err) = buf.ensure_loaded()
        {
            return Err(err.to_string());
        }
        Ok(index)
    }

    /// Repaint whichever views show the mutated buffer. The hint is
    /// the widened combination of the request's edits, so a view that
    /// did not scroll repaints only the damaged band.
    fn refresh_views_of(&mut self, index: usize, hint: EditHint, out: &mut Writer) {
        if matches!(hint, EditHint::None) {
            return;
        }
        if self.top.buffer == index
            && let Some(buf) = self.buffers.at(index)
        {
            self.top.view.update_after_edit(hint, buf, &self.defaults, out);
        }
        if let Some(slot) = self.bottom.as_mut()
            && slot.buffer == index
            && let Some(buf) = self.buffers.at(index)
        {
            slot.view.update_after_edit(hint, buf, &self.defaults, out);
        }
        self.place_active_cursor(out);
    }

    /// Clamp 1-based wire line numbers into the buffer. Returns
    /// 0-based (start, end) or an error when start is out of range.
    fn clamp_range(
        &self,
        index: usize,
        start_line: i64,
        end_line: i64,
    ) -> Result<(usize, usize), String> {
        let line_count = self
            .buffers
            .at(index)
            .map(|b| b.number_of_lines())
            .unwrap_or(0);
        let start = (start_line - 1).max(0) as usize;
        let end = (end_line - 1).max(0) as usize;
        if start >= line_count {
            return Err("start line out of range".to_string());
        }
        let end = end.min(line_count - 1);
        if start > end {
            return Err("invalid line range".to_string());
        }
        Ok((start, end))
    }

    //---------------------------------------------------------------
    // Read commands
    //---------------------------------------------------------------

    fn agent_list_buffers(&mut self) -> Result<Value, String> {
        let buffers: Vec<Value> = self
            .buffers
            .iter()
            .map(|buf| {
                json!({
                    "buffer_id": buf.file_path(),
                    "path": buf.file_path(),
                    "modified": buf.is_touched(),
                })
            })
            .collect();
        Ok(Value::Array(buffers))
    }

    fn agent_get_buffer(&mut self, request: &BridgeRequest) -> Result<Value, String> {
        let index = self.resolve_buffer(&request.str_arg("buffer_id"))?;
        let buf = self.buffers.at(index).ok_or("buffer not found")?;
        let content = buf.flatten();
        if content.len() > MAX_GET_BUFFER_BYTES {
            return Err(format!(
                "buffer too large ({} bytes, {} lines). Use get_buffer_range with start_line and end_line to read in chunks.",
                content.len(),
                buf.number_of_lines()
            ));
        }
        Ok(Value::String(content))
    }

    fn agent_get_buffer_range(&mut self, request: &BridgeRequest) -> Result<Value, String> {
        let index = self.resolve_buffer(&request.str_arg("buffer_id"))?;
        let (start, end) = self.clamp_range(
            index,
            request.int_arg("start_line", 1),
            request.int_arg("end_line", 1),
        )?;
        let buf = self.buffers.at(index).ok_or("buffer not found")?;
        let lines: Vec<&str> = (start..=end).map(|i| buf.line(i).as_str()).collect();
        Ok(Value::String(lines.join("\n")))
    }

    fn agent_get_cursor(&mut self) -> Result<Value, String> {
        if self.buffers.is_empty() {
            return Err("no active buffer".to_string());
        }
        let (path, cursor) =
            self.with_active(|_, buf, _| (buf.file_path().to_string(), buf.cursor));
        Ok(json!({
            "buffer_id": path,
            "line": cursor.row + 1,
            "col": cursor.col + 1,
        }))
    }

    fn agent_find_in_buffer(&mut self, request: &BridgeRequest) -> Result<Value, String> {
        let index = self.resolve_buffer(&request.str_arg("buffer_id"))?;
        let pattern = request.str_arg("pattern");
        if pattern.is_empty() {
            return Err("pattern is required".to_string());
        }
        let is_regex = request.bool_arg("is_regex");
        let case_insensitive = request.bool_arg("case_insensitive");

        let regex = if is_regex {
            Some(
                RegexBuilder::new(&pattern)
                    .case_insensitive(case_insensitive)
                    .build()
                    .map_err(|err| format!("invalid regex: {err}"))?,
            )
        } else {
            None
        };
        let needle = pattern.to_lowercase();

        let buf = self.buffers.at(index).ok_or("buffer not found")?;
        let mut matches = Vec::new();
        for i in 0..buf.number_of_lines() {
            let text = buf.line(i).as_str();
            let hit = match &regex {
                Some(re) => re.is_match(text),
                None if case_insensitive => text.to_lowercase().contains(&needle),
                None => text.contains(&pattern),
            };
            if hit {
                matches.push(json!({ "line": i + 1, "text": text }));
            }
        }
        Ok(Value::Array(matches))
    }

    //---------------------------------------------------------------
    // Mutating commands
    //---------------------------------------------------------------

    fn agent_replace_range(
        &mut self,
        request: &BridgeRequest,
        out: &mut Writer,
    ) -> Result<Value, String> {
        let index = self.resolve_buffer(&request.str_arg("buffer_id"))?;
        let start_line = request.int_arg("start_line", 1);
        let end_line = request.int_arg("end_line", 1);
        let (start, end) = self.clamp_range(index, start_line, end_line)?;
        let new_text = request.str_arg("new_text");

        let buf = self.buffers.at_mut(index).ok_or("buffer not found")?;
        buf.goto_line(start);
        buf.set_mark();
        let end_col = buf.char_count(end);
        buf.goto_position(cm_buffer::Position::new(end, end_col));
        let (_, cut_hint) = buf.cut_to_mark();
        let hint = cut_hint.widen(buf.insert_text(&new_text));

        self.refresh_views_of(index, hint, out);
        self.message(&format!("(agent: replaced lines {start_line}-{end_line})"), out);
        Ok(Value::String(format!(
            "replaced lines {start_line}-{end_line}"
        )))
    }

    fn agent_insert_lines(
        &mut self,
        request: &BridgeRequest,
        out: &mut Writer,
    ) -> Result<Value, String> {
        let index = self.resolve_buffer(&request.str_arg("buffer_id"))?;
        let before_line = request.int_arg("before_line", 1);
        let text = request.str_arg("text");
        if text.is_empty() {
            return Ok(Value::String(format!(
                "inserted 0 lines before line {before_line}"
            )));
        }
        // Lines inserted: segments, not counting a trailing newline's
        // empty tail.
        let inserted =
            text.split('\n').count() - usize::from(text.ends_with('\n'));

        let buf = self.buffers.at_mut(index).ok_or("buffer not found")?;
        let line_count = buf.number_of_lines();
        let line = (before_line - 1).max(0) as usize;
        let hint = if line >= line_count {
            // Append to the end of the buffer.
            let last = line_count - 1;
            buf.goto_position(cm_buffer::Position::new(last, buf.char_count(last)));
            let h = buf.insert_newline();
            h.widen(buf.insert_text(text.strip_suffix('\n').unwrap_or(&text)))
        } else {
            buf.goto_line(line);
            let h = buf.insert_text(&text);
            if text.ends_with('\n') {
                h
            } else {
                h.widen(buf.insert_newline())
            }
        };

        self.refresh_views_of(index, hint, out);
        self.message(
            &format!("(agent: inserted {inserted} lines at line {before_line})"),
            out,
        );
        Ok(Value::String(format!(
            "inserted {inserted} lines before line {before_line}"
        )))
    }

    fn agent_delete_lines(
        &mut self,
        request: &BridgeRequest,
        out: &mut Writer,
    ) -> Result<Value, String> {
        let index = self.resolve_buffer(&request.str_arg("buffer_id"))?;
        let start_line = request.int_arg("start_line", 1);
        let end_line = request.int_arg("end_line", 1);
        let (start, end) = self.clamp_range(index, start_line, end_line)?;

        let buf = self.buffers.at_mut(index).ok_or("buffer not found")?;
        buf.goto_line(start);
        buf.set_mark();
        if end + 1 < buf.number_of_lines() {
            buf.goto_line(end + 1);
        } else {
            buf.goto_position(cm_buffer::Position::new(end, buf.char_count(end)));
        }
        let (_, hint) = buf.cut_to_mark();

        self.refresh_views_of(index, hint, out);
        self.message(&format!("(agent: deleted lines {start_line}-{end_line})"), out);
        Ok(Value::String(format!(
            "deleted lines {start_line}-{end_line}"
        )))
    }

    fn agent_find_and_replace(
        &mut self,
        request: &BridgeRequest,
        out: &mut Writer,
    ) -> Result<Value, String> {
        let index = self.resolve_buffer(&request.str_arg("buffer_id"))?;
        let pattern = request.str_arg("pattern");
        if pattern.is_empty() {
            return Err("pattern is required".to_string());
        }
        let replacement = request.str_arg("replacement");
        let is_regex = request.bool_arg("is_regex");
        let case_insensitive = request.bool_arg("case_insensitive");
        let max_replacements = request.int_arg("max_replacements", 0).max(0) as usize;

        let regex = if is_regex {
            Some(
                RegexBuilder::new(&pattern)
                    .case_insensitive(case_insensitive)
                    .build()
                    .map_err(|err| format!("invalid regex: {err}"))?,
            )
        } else {
            None
        };

        let buf = self.buffers.at_mut(index).ok_or("buffer not found")?;
        let mut total = 0usize;
        let mut hint = EditHint::None;
        for i in 0..buf.number_of_lines() {
            if max_replacements > 0 && total >= max_replacements {
                break;
            }
            let line = buf.line(i).as_str().to_string();
            let occurrences = match &regex {
                Some(re) => re.find_iter(&line).count(),
                None => line.matches(pattern.as_str()).count(),
            };
            if occurrences == 0 {
                continue;
            }
            let quota = if max_replacements > 0 {
                occurrences.min(max_replacements - total)
            } else {
                occurrences
            };
            let new_line = match &regex {
                Some(re) => re
                    .replacen(&line, quota, regex::NoExpand(&replacement))
                    .into_owned(),
                None => line.replacen(pattern.as_str(), &replacement, quota),
            };
            if new_line != line {
                buf.goto_line(i);
                buf.set_mark();
                buf.goto_position(cm_buffer::Position::new(i, buf.char_count(i)));
                let (_, cut_hint) = buf.cut_to_mark();
                hint = hint.widen(cut_hint).widen(buf.insert_text(&new_line));
                total += quota;
            }
        }

        if total > 0 {
            self.refresh_views_of(index, hint, out);
            self.message(&format!("(agent: replaced {total} occurrences)"), out);
        } else {
            self.message("(agent: no replacements made)", out);
        }
        Ok(json!({
            "replacements": total,
            "message": format!("replaced {total} occurrences"),
        }))
    }

    //---------------------------------------------------------------
    // File commands
    //---------------------------------------------------------------

    fn agent_open_file(
        &mut self,
        request: &BridgeRequest,
        out: &mut Writer,
    ) -> Result<Value, String> {
        let path = request.str_arg("path");
        if path.is_empty() {
            return Err("path is required".to_string());
        }
        let resolved = if Path::new(&path).is_absolute() {
            path.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&path).to_string_lossy().to_string())
                .unwrap_or_else(|_| path.clone())
        };

        if let Some(index) = self.buffers.resolve(&resolved) {
            self.switch_to_buffer(index, out);
            self.message(&format!("(agent: switched to {path})"), out);
            return Ok(Value::String(format!("switched to {resolved}")));
        }
        if !Path::new(&resolved).exists() {
            return Err(format!("file not found: {resolved}"));
        }
        if !self.load_new_file(&resolved, true, out) {
            return Err(format!("failed to open file: {resolved}"));
        }
        self.message(&format!("(agent: opened {path})"), out);
        Ok(Value::String(format!("opened {path}")))
    }

    fn agent_save_buffer(
        &mut self,
        request: &BridgeRequest,
        out: &mut Writer,
    ) -> Result<Value, String> {
        let index = self.resolve_buffer(&request.str_arg("buffer_id"))?;
        let buf = self.buffers.at_mut(index).ok_or("buffer not found")?;
        let path = buf.file_path().to_string();
        if path.is_empty() {
            return Err("buffer has no file path".to_string());
        }
        buf.save_text(&path).map_err(|err| err.to_string())?;
        self.message(&format!("(agent: saved {})", display_name(&path)), out);
        Ok(Value::String("saved".to_string()))
    }

    fn agent_goto_line(
        &mut self,
        request: &BridgeRequest,
        out: &mut Writer,
    ) -> Result<Value, String> {
        let index = self.resolve_buffer(&request.str_arg("buffer_id"))?;
        if index != self.active_buffer_index() {
            return Err("buffer is not the active buffer".to_string());
        }
        let line = request.int_arg("line", 1).max(1) as usize;
        self.with_active(|view, buf, defaults| {
            view.cursor_goto_line(buf, line - 1, defaults, out);
            view.place_cursor(buf, out);
        });
        self.message(&format!("(agent: jumped to line {line})"), out);
        Ok(Value::String(format!("moved to line {line}")))
    }
}
