use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use kurbo::DEFAULT_ACCURACY;
use ordered_float::NotNan;
use overlay::{
    strategy::{ExactSide, RobustSide, SquaredDistance},
    Geometry, MultiPolygon, Operator, OverlayOptions, Point, PointOrder, Polygon, Ring,
};

type Float = NotNan<f64>;

#[derive(Copy, Clone, Debug)]
struct Op(Operator);

impl FromStr for Op {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(Op(Operator::Union)),
            "intersection" => Ok(Op(Operator::Intersection)),
            "difference" => Ok(Op(Operator::Difference)),
            _ => Err(format!("unknown op {s}")),
        }
    }
}

/// Combines the first two paths of an SVG file.
///
/// Every closed subpath becomes a polygon of its own, so the paths
/// shouldn't have holes.
#[derive(Parser)]
struct Args {
    input: PathBuf,
    output: PathBuf,

    #[arg(long)]
    op: Op,

    /// Use adaptive floating-point predicates instead of exact ones.
    #[arg(long)]
    robust: bool,
}

fn pt(p: usvg::tiny_skia_path::Point) -> kurbo::Point {
    kurbo::Point::new(p.x as f64, p.y as f64)
}

fn to_point(p: kurbo::Point) -> anyhow::Result<Point<Float>> {
    Ok(Point::new(p.x.try_into()?, p.y.try_into()?))
}

fn push_ring(points: &mut Vec<Point<Float>>, polys: &mut Vec<Polygon<Float>>) {
    let ring = Ring::new(points.drain(..));
    match ring.point_order() {
        Some(PointOrder::Clockwise) => polys.push(ring.into()),
        Some(PointOrder::CounterClockwise) => polys.push(ring.reversed().into()),
        None => {}
    }
}

fn path_to_geometry(path: &usvg::Path) -> anyhow::Result<Geometry<Float>> {
    let kurbo_els = path.data().segments().map(|seg| match seg {
        usvg::tiny_skia_path::PathSegment::MoveTo(p) => kurbo::PathEl::MoveTo(pt(p)),
        usvg::tiny_skia_path::PathSegment::LineTo(p) => kurbo::PathEl::LineTo(pt(p)),
        usvg::tiny_skia_path::PathSegment::QuadTo(p0, p1) => kurbo::PathEl::QuadTo(pt(p0), pt(p1)),
        usvg::tiny_skia_path::PathSegment::CubicTo(p0, p1, p2) => {
            kurbo::PathEl::CurveTo(pt(p0), pt(p1), pt(p2))
        }
        usvg::tiny_skia_path::PathSegment::Close => kurbo::PathEl::ClosePath,
    });

    let mut polys = Vec::new();
    let mut points = Vec::new();
    let mut err = None;
    kurbo::flatten(kurbo_els, DEFAULT_ACCURACY, |el| match el {
        kurbo::PathEl::MoveTo(p) | kurbo::PathEl::LineTo(p) => {
            if matches!(el, kurbo::PathEl::MoveTo(_)) {
                push_ring(&mut points, &mut polys);
            }
            match to_point(p) {
                Ok(p) => points.push(p),
                Err(e) => err = Some(e),
            }
        }
        kurbo::PathEl::ClosePath => push_ring(&mut points, &mut polys),
        kurbo::PathEl::QuadTo(..) | kurbo::PathEl::CurveTo(..) => unreachable!(),
    });
    if let Some(e) = err {
        return Err(e);
    }
    push_ring(&mut points, &mut polys);
    Ok(MultiPolygon(polys).into())
}

fn collect_paths<'a>(group: &'a usvg::Group, out: &mut Vec<&'a usvg::Path>) {
    for child in group.children() {
        match child {
            usvg::Node::Group(group) => collect_paths(group, out),
            usvg::Node::Path(path) => out.push(path),
            _ => {}
        }
    }
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let input = std::fs::read_to_string(&args.input)?;
    let tree = usvg::Tree::from_str(&input, &usvg::Options::default())?;
    let mut paths = Vec::new();
    collect_paths(tree.root(), &mut paths);
    let [a, b] = paths.as_slice() else {
        anyhow::bail!("expected exactly two paths, found {}", paths.len());
    };
    let a = path_to_geometry(a)?;
    let b = path_to_geometry(b)?;

    let options = OverlayOptions::new(args.op.0);
    let mut out = MultiPolygon::default();
    if args.robust {
        overlay::overlay(&a, &b, &options, &RobustSide, &SquaredDistance, &mut out)?;
    } else {
        overlay::overlay(&a, &b, &options, &ExactSide, &SquaredDistance, &mut out)?;
    }

    let points: Vec<_> = a
        .polygons()
        .iter()
        .chain(b.polygons().iter())
        .flat_map(|poly| poly.exterior.points().to_vec())
        .collect();
    let min_x = points.iter().map(|p| p.x).min().map_or(0.0, |x| x.into_inner());
    let max_x = points.iter().map(|p| p.x).max().map_or(0.0, |x| x.into_inner());
    let min_y = points.iter().map(|p| p.y).min().map_or(0.0, |y| y.into_inner());
    let max_y = points.iter().map(|p| p.y).max().map_or(0.0, |y| y.into_inner());
    let pad = 1.0;
    let mut document = svg::Document::new().set(
        "viewBox",
        (
            min_x - pad,
            min_y - pad,
            max_x - min_x + 2.0 * pad,
            max_y - min_y + 2.0 * pad,
        ),
    );

    for poly in out.polygons() {
        let mut data = svg::node::element::path::Data::new();
        for ring in poly.rings() {
            let mut ring = ring.points().iter();
            let Some(p) = ring.next() else {
                continue;
            };

            data = data.move_to((p.x.into_inner(), p.y.into_inner()));
            for p in ring {
                data = data.line_to((p.x.into_inner(), p.y.into_inner()));
            }
            data = data.close();
        }
        let path = svg::node::element::Path::new()
            .set("d", data)
            .set("fill", "black")
            .set("fill-rule", "evenodd");
        document = document.add(path);
    }

    svg::save(&args.output, &document)?;

    Ok(())
}
