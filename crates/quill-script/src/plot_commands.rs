//! Plot commands: drawing datasets and annotations on the page.

use std::path::Path;
use std::rc::Rc;

use quill_data::load_text_file;
use quill_render::{MarkerGlyph, StrokeStyle};
use quill_types::color::Color;
use quill_types::error::{QuillError, Result};
use quill_types::value::Value;

use crate::command::{
    Command, CommandArgument, CommandOption, CommandOutput, OptionSet, arg_text,
};
use crate::context::Context;
use crate::data_commands::load_spec_from;
use crate::registry::CommandRegistry;

/// Page margin around the plot area, in points.
const MARGIN: f64 = 40.0;

/// Marker size in points.
const MARKER_SIZE: f64 = 3.0;

pub(crate) fn register_plot_commands(reg: &mut CommandRegistry) -> Result<()> {
    let text = reg.types().lookup("text")?;
    let float = reg.types().lookup("float")?;
    let float_list = reg.types().lookup("float-list")?;
    let color = reg.types().lookup("color")?;
    let line_style = reg.types().lookup("line-style")?;
    let marker_style = reg.types().lookup("marker-style")?;
    let color_set = reg.types().lookup("color-set")?;
    let int = reg.types().lookup("int")?;
    let text_list = reg.types().lookup("text-list")?;

    reg.register(
        Command::new(
            "plot",
            Some('p'),
            Some("plot"),
            vec![CommandArgument::new("file", Rc::clone(&text)).described("Data file to plot")],
            Box::new(|ctx, args, opts| {
                let file = arg_text(args, 0);
                let spec = load_spec_from(opts)?;
                let dataset = load_text_file(Path::new(&file), &spec)?;
                log::info!("plotting '{}' ({} rows)", dataset.name(), dataset.len());
                ctx.data.push(dataset);
                ctx.mark_data_loaded();
                draw_top(ctx)
            }),
        )?
        .with_option(
            "every",
            CommandOption::new(CommandArgument::new("n", int).described("Keep every n-th row")),
        )
        .with_option(
            "columns",
            CommandOption::new(
                CommandArgument::new("list", text_list).described("Zero-based column selection"),
            ),
        )
        .with_option(
            "name",
            CommandOption::new(CommandArgument::new("name", Rc::clone(&text))),
        )
        .describe(
            "Load a data file and draw it",
            "Shorthand for load followed by draw; the dataset hook runs \
             after the whole command.",
            Some("plot"),
        ),
    )?;

    reg.register(
        Command::new(
            "draw",
            None,
            Some("draw"),
            vec![],
            Box::new(|ctx, _, _| draw_top(ctx)),
        )?
        .describe("Draw the top dataset", "", Some("plot")),
    )?;

    reg.register(
        Command::new(
            "line",
            None,
            Some("line"),
            vec![
                CommandArgument::new("x1", Rc::clone(&float)),
                CommandArgument::new("y1", Rc::clone(&float)),
                CommandArgument::new("x2", Rc::clone(&float)),
                CommandArgument::new("y2", Rc::clone(&float)),
            ],
            Box::new(|ctx, args, opts| {
                let coords: Vec<f64> = args.iter().filter_map(Value::as_f64).collect();
                let [x1, y1, x2, y2] = coords[..] else {
                    return Err(QuillError::Data("line expects four coordinates".into()));
                };
                ctx.ensure_page();
                apply_stroke_options(ctx, opts);
                ctx.renderer.polyline(&[(x1, y1), (x2, y2)]);
                Ok(CommandOutput::None)
            }),
        )?
        .with_option(
            "color",
            CommandOption::new(CommandArgument::new("color", Rc::clone(&color))),
        )
        .with_option(
            "width",
            CommandOption::new(CommandArgument::new("width", Rc::clone(&float))),
        )
        .describe(
            "Draw a straight line segment",
            "Coordinates are page points with the origin at the bottom left.",
            Some("plot"),
        ),
    )?;

    reg.register(
        Command::new(
            "draw-text",
            None,
            Some("draw-text"),
            vec![
                CommandArgument::new("x", Rc::clone(&float)),
                CommandArgument::new("y", Rc::clone(&float)),
                CommandArgument::new("text", Rc::clone(&text)),
            ],
            Box::new(|ctx, args, opts| {
                let x = args.first().and_then(Value::as_f64).unwrap_or_default();
                let y = args.get(1).and_then(Value::as_f64).unwrap_or_default();
                let message = arg_text(args, 2);
                ctx.ensure_page();
                apply_stroke_options(ctx, opts);
                ctx.renderer.text(x, y, &message);
                Ok(CommandOutput::None)
            }),
        )?
        .with_option(
            "color",
            CommandOption::new(CommandArgument::new("color", Rc::clone(&color))),
        )
        .describe("Draw text at page coordinates", "", Some("plot")),
    )?;

    reg.register(
        Command::new(
            "title",
            Some('t'),
            Some("title"),
            vec![CommandArgument::new("text", text).described("Figure title")],
            Box::new(|ctx, args, _| {
                ctx.figure.title = Some(arg_text(args, 0));
                Ok(CommandOutput::None)
            }),
        )?
        .describe("Set the figure title", "", Some("plot")),
    )?;

    reg.register(
        Command::new(
            "xrange",
            None,
            Some("xrange"),
            vec![CommandArgument::new("range", Rc::clone(&float_list)).described("min,max")],
            Box::new(|ctx, args, _| {
                ctx.figure.xrange = Some(range_pair("xrange", args)?);
                Ok(CommandOutput::None)
            }),
        )?
        .describe("Fix the abscissa range", "", Some("plot")),
    )?;

    reg.register(
        Command::new(
            "yrange",
            None,
            Some("yrange"),
            vec![CommandArgument::new("range", float_list).described("min,max")],
            Box::new(|ctx, args, _| {
                ctx.figure.yrange = Some(range_pair("yrange", args)?);
                Ok(CommandOutput::None)
            }),
        )?
        .describe("Fix the ordinate range", "", Some("plot")),
    )?;

    reg.register(
        Command::new(
            "line-style",
            None,
            Some("line-style"),
            vec![CommandArgument::new("style", line_style)],
            Box::new(|ctx, args, _| {
                let name = arg_text(args, 0);
                let style = StrokeStyle::from_name(&name).ok_or_else(|| {
                    QuillError::InvalidValue {
                        type_name: "line-style".into(),
                        raw: name.clone(),
                    }
                })?;
                ctx.figure.line_style = style;
                Ok(CommandOutput::None)
            }),
        )?
        .describe("Set the stroke style for dataset lines", "", Some("plot")),
    )?;

    reg.register(
        Command::new(
            "marker",
            None,
            Some("marker"),
            vec![CommandArgument::new("marker", marker_style)],
            Box::new(|ctx, args, _| {
                let name = arg_text(args, 0);
                let glyph = MarkerGlyph::from_name(&name).ok_or_else(|| {
                    QuillError::InvalidValue {
                        type_name: "marker-style".into(),
                        raw: name.clone(),
                    }
                })?;
                ctx.figure.marker = Some(glyph);
                Ok(CommandOutput::None)
            }),
        )?
        .describe("Set the data-point marker glyph", "", Some("plot")),
    )?;

    reg.register(
        Command::new(
            "color-map",
            None,
            Some("color-map"),
            vec![CommandArgument::new("colors", color_set).described("Palette name or color list")],
            Box::new(|ctx, args, _| {
                let Some(items) = args.first().and_then(Value::as_list) else {
                    return Err(QuillError::Data("color-map expects a color list".into()));
                };
                let colors: Vec<Color> = items.iter().filter_map(Value::as_color).collect();
                if colors.is_empty() {
                    return Err(QuillError::Data(
                        "color-map needs at least one color".into(),
                    ));
                }
                ctx.figure.color_map = colors;
                Ok(CommandOutput::None)
            }),
        )?
        .describe("Set the colors cycled across datasets", "", Some("plot")),
    )?;

    Ok(())
}

fn apply_stroke_options(ctx: &mut Context, opts: &OptionSet) {
    if let Some(color) = opts.get("color").and_then(Value::as_color) {
        ctx.renderer.set_color(color);
    }
    if let Some(width) = opts.get("width").and_then(Value::as_f64) {
        ctx.renderer.set_line_width(width);
    }
}

fn range_pair(command: &str, args: &[Value]) -> Result<(f64, f64)> {
    let values = args.first().and_then(Value::as_f64_list).unwrap_or_default();
    let [min, max] = values[..] else {
        return Err(QuillError::Data(format!(
            "{command} expects two values, got {}",
            values.len()
        )));
    };
    Ok((min, max))
}

/// Draw the top dataset with the current figure style.
pub(crate) fn draw_top(ctx: &mut Context) -> Result<CommandOutput> {
    let (points, index) = {
        let Some(dataset) = ctx.data.top() else {
            return Err(QuillError::Data("no dataset on the stack".into()));
        };
        if dataset.is_empty() {
            return Err(QuillError::Data(format!(
                "dataset '{}' is empty",
                dataset.name()
            )));
        }
        (dataset.points(), ctx.data.len() - 1)
    };

    let (xb, yb) = bounds_of(&points);
    let xr = ctx.figure.xrange.unwrap_or_else(|| pad(xb));
    let yr = ctx.figure.yrange.unwrap_or_else(|| pad(yb));

    ctx.ensure_page();
    let mapped = map_points(
        &points,
        xr,
        yr,
        ctx.output.page_width,
        ctx.output.page_height,
    );
    let color = ctx.color_for(index);
    let (width, style, marker) = (
        ctx.figure.line_width,
        ctx.figure.line_style,
        ctx.figure.marker,
    );
    ctx.renderer.set_color(color);
    ctx.renderer.set_line_width(width);
    ctx.renderer.set_line_style(style);
    ctx.renderer.polyline(&mapped);
    if let Some(glyph) = marker {
        for &(x, y) in &mapped {
            ctx.renderer.marker(x, y, glyph, MARKER_SIZE);
        }
    }
    Ok(CommandOutput::None)
}

fn bounds_of(points: &[(f64, f64)]) -> ((f64, f64), (f64, f64)) {
    let mut xb = (f64::INFINITY, f64::NEG_INFINITY);
    let mut yb = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        xb = (xb.0.min(x), xb.1.max(x));
        yb = (yb.0.min(y), yb.1.max(y));
    }
    (xb, yb)
}

/// Widen a data range slightly; degenerate ranges get a unit width.
fn pad((min, max): (f64, f64)) -> (f64, f64) {
    if min == max {
        (min - 0.5, max + 0.5)
    } else {
        let margin = (max - min) * 0.05;
        (min - margin, max + margin)
    }
}

fn map_points(
    points: &[(f64, f64)],
    xr: (f64, f64),
    yr: (f64, f64),
    page_w: f64,
    page_h: f64,
) -> Vec<(f64, f64)> {
    let sx = (page_w - 2.0 * MARGIN) / (xr.1 - xr.0);
    let sy = (page_h - 2.0 * MARGIN) / (yr.1 - yr.0);
    points
        .iter()
        .map(|&(x, y)| (MARGIN + (x - xr.0) * sx, MARGIN + (y - yr.0) * sy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_widens_and_handles_degenerate_ranges() {
        assert_eq!(pad((0.0, 10.0)), (-0.5, 10.5));
        assert_eq!(pad((3.0, 3.0)), (2.5, 3.5));
    }

    #[test]
    fn map_points_spans_the_margins() {
        let mapped = map_points(&[(0.0, 0.0), (1.0, 1.0)], (0.0, 1.0), (0.0, 1.0), 480.0, 320.0);
        assert_eq!(mapped[0], (MARGIN, MARGIN));
        assert_eq!(mapped[1], (480.0 - MARGIN, 320.0 - MARGIN));
    }

    #[test]
    fn bounds_of_points() {
        let (xb, yb) = bounds_of(&[(1.0, -2.0), (3.0, 4.0)]);
        assert_eq!(xb, (1.0, 3.0));
        assert_eq!(yb, (-2.0, 4.0));
    }

    #[test]
    fn range_pair_validates_length() {
        let good = vec![Value::List(vec![Value::Float(0.0), Value::Float(1.0)])];
        assert_eq!(range_pair("xrange", &good).unwrap(), (0.0, 1.0));
        let bad = vec![Value::List(vec![Value::Float(0.0)])];
        assert!(range_pair("xrange", &bad).is_err());
    }
}
