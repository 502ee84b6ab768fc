/*!

# Quick start

This example walks through a small scheduling poll end to end, using the
`termpoll` command line tool. The poll offers a fixed grid of time slots
(days × times); every participant marks any number of slots as *primary*
(first choice, 2 points) or *secondary* (acceptable fallback, 1 point).

**Describing the poll** The built-in default poll offers five days
(`Mo 10.02.` … `Fr 14.02.`) with five times each (`16:30` … `18:30`). To run
a different poll, write a JSON description and pass it with `--config`:

```json
{
    "title": "Team offsite",
    "adminSecret": "s3cret",
    "days": [
        {"label": "Mo 10.02.", "short": "Mo"},
        {"label": "Di 11.02.", "short": "Di"}
    ],
    "times": ["16:30", "17:00"]
}
```

**Voting** Each participant submits a vote under their own name. A slot
identifier is the day label followed by the time label:

```bash
termpoll vote --name Anna \
    --primary 'Mo 10.02. 16:30' --primary 'Di 11.02. 17:00' \
    --secondary 'Mo 10.02. 17:00'
```

Submitting again under the same name (the match is case-insensitive, so
`anna` and `ANNA` are the same participant) overwrites the previous vote.
There is one vote per participant, and the last write wins.

**Results** The aggregated per-slot counts are available to everyone:

```bash
termpoll results
```

This prints a JSON summary with, for every slot of the grid, the number of
primary and secondary selections and the weighted score
(2 × primary + 1 × secondary).

**The admin view** The ranking of slots by score and the per-voter listing
are part of the admin view:

```bash
termpoll results --admin=s3cret
```

Slots with equal scores share a rank, and slots nobody selected are left out
of the ranking. When the poll has no `adminSecret` configured, `--admin`
without a value is enough.

*/
